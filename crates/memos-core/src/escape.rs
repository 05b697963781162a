//! Escaping for text embedded in single-quoted shell literals

/// Make `raw` safe to place between single quotes in a shell command.
///
/// Each `'` becomes `'\''`: close the current literal, emit an escaped
/// quote, reopen. Every other character passes through untouched, since
/// nothing else is special inside a single-quoted span.
pub fn escape(raw: &str) -> String {
    raw.replace('\'', r"'\''")
}

/// Wrap `raw` in single quotes after escaping it.
pub fn single_quote(raw: &str) -> String {
    format!("'{}'", escape(raw))
}

/// Make `raw` safe inside an AppleScript double-quoted string.
///
/// Backslashes and double quotes are escaped; line breaks become spaces and
/// other control characters are dropped, since each script line is passed
/// as its own `-e` argument.
pub fn applescript_string(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\n', '\r'], " ")
        .chars()
        .filter(|&c| c >= ' ' || c == '\t')
        .collect()
}
