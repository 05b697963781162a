//! AppleScript templates for driving Voice Memos

use crate::escape::{applescript_string, single_quote};

pub const DEFAULT_APP_NAME: &str = "VoiceMemos";
pub const DEFAULT_PROCESS_NAME: &str = "VoiceMemos";
pub const DEFAULT_PLAYER: &str = "afplay";

/// Builds the shell command lines the dispatcher runs.
///
/// Pure text composition. App and process names are escaped for AppleScript
/// here; the path passed to [`Scripts::play`] must already be escaped by the
/// caller.
#[derive(Debug, Clone)]
pub struct Scripts {
    app_name: String,
    process_name: String,
    player: String,
}

impl Scripts {
    pub fn new(
        app_name: impl Into<String>,
        process_name: impl Into<String>,
        player: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            process_name: process_name.into(),
            player: player.into(),
        }
    }

    /// Bring Voice Memos to the front, launching it if needed
    pub fn activate(&self) -> String {
        osascript(&[format!(
            r#"tell application "{}" to activate"#,
            applescript_string(&self.app_name)
        )])
    }

    /// Click the record button in the front window.
    ///
    /// Voice Memos has a single toggle control, so start and stop share
    /// this script.
    pub fn toggle_recording(&self) -> String {
        osascript(&[
            format!(
                r#"tell application "{}" to activate"#,
                applescript_string(&self.app_name)
            ),
            "delay 0.5".to_string(),
            r#"tell application "System Events""#.to_string(),
            format!(
                r#"tell process "{}""#,
                applescript_string(&self.process_name)
            ),
            "click button 1 of window 1".to_string(),
            "end tell".to_string(),
            "end tell".to_string(),
        ])
    }

    /// Play the recording at `escaped_path`
    pub fn play(&self, escaped_path: &str) -> String {
        format!("{} '{}'", self.player, escaped_path)
    }
}

impl Default for Scripts {
    fn default() -> Self {
        Self::new(DEFAULT_APP_NAME, DEFAULT_PROCESS_NAME, DEFAULT_PLAYER)
    }
}

/// `osascript -e '<line>' -e '<line>' ...`, one `-e` per script line
fn osascript(lines: &[String]) -> String {
    let mut command = String::from("osascript");
    for line in lines {
        command.push_str(" -e ");
        command.push_str(&single_quote(line));
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::escape;

    #[test]
    fn test_activate() {
        let scripts = Scripts::default();
        assert_eq!(
            scripts.activate(),
            r#"osascript -e 'tell application "VoiceMemos" to activate'"#
        );
    }

    #[test]
    fn test_toggle_recording_clicks_front_window() {
        let script = Scripts::default().toggle_recording();
        assert!(script.starts_with("osascript -e "));
        assert!(script.contains(r#"-e 'tell application "System Events"'"#));
        assert!(script.contains(r#"-e 'tell process "VoiceMemos"'"#));
        assert!(script.contains("-e 'click button 1 of window 1'"));
        assert_eq!(script.matches("-e 'end tell'").count(), 2);
    }

    #[test]
    fn test_play_uses_escaped_path() {
        let scripts = Scripts::default();
        let path = "/Users/me/Recordings/test's memo.m4a";
        assert_eq!(
            scripts.play(&escape(path)),
            r"afplay '/Users/me/Recordings/test'\''s memo.m4a'"
        );
    }

    #[test]
    fn test_custom_names_are_quoted() {
        let scripts = Scripts::new("Bob's Recorder", "Recorder", "mpv");
        assert_eq!(
            scripts.activate(),
            r#"osascript -e 'tell application "Bob'\''s Recorder" to activate'"#
        );
        assert_eq!(scripts.play("/a.m4a"), "mpv '/a.m4a'");
    }

    #[test]
    fn test_names_cannot_break_out_of_applescript_strings() {
        let scripts = Scripts::new(r#"Memos" to quit"#, r"Rec\order", "afplay");
        assert_eq!(
            scripts.activate(),
            r#"osascript -e 'tell application "Memos\" to quit" to activate'"#
        );
        let toggle = scripts.toggle_recording();
        assert!(toggle.contains(r#"-e 'tell application "Memos\" to quit" to activate'"#));
        assert!(toggle.contains(r#"-e 'tell process "Rec\\order"'"#));
    }
}
