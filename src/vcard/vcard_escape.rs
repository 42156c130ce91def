//! vCard text escaping.

/// Escapes a text value: backslash, newline, comma and semicolon.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\r' => {} // newlines are written as \n only
            _ => result.push(c),
        }
    }

    result
}

/// Escapes a parameter value.
///
/// Returns `(value, needs_quotes)`. Double quotes cannot appear inside a
/// quoted parameter so they are replaced with single quotes.
pub fn escape_param_value(s: &str) -> (String, bool) {
    let mut result = String::with_capacity(s.len());
    let mut needs_quotes = false;

    for c in s.chars() {
        match c {
            '"' => result.push('\''),
            ':' | ';' | ',' => {
                result.push(c);
                needs_quotes = true;
            }
            _ if c.is_control() => {}
            _ => result.push(c),
        }
    }

    (result, needs_quotes)
}
