//! vCard line folding.

/// Maximum line length in octets, excluding the CRLF
const MAX_LINE_OCTETS: usize = 75;

/// Folds a content line by inserting CRLF + space.
///
/// Breaks only on UTF-8 character boundaries; continuation lines count the
/// leading space towards the limit.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut current_len = 0;

    for c in line.chars() {
        let char_len = c.len_utf8();
        if current_len + char_len > MAX_LINE_OCTETS {
            result.push_str("\r\n ");
            current_len = 1;
        }
        result.push(c);
        current_len += char_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_line_unchanged() {
        assert_eq!(fold_line("FN:Jane Doe"), "FN:Jane Doe");
    }

    #[test]
    fn folds_at_75_octets() {
        let folded = fold_line(&"X".repeat(80));
        let segments: Vec<&str> = folded.split("\r\n").collect();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 75);
        assert_eq!(segments[1], format!(" {}", "X".repeat(5)));
    }

    #[test]
    fn every_segment_within_limit() {
        let folded = fold_line(&format!("PHOTO;ENCODING=b:{}", "A".repeat(500)));
        for segment in folded.split("\r\n") {
            assert!(segment.len() <= MAX_LINE_OCTETS, "segment too long: {}", segment.len());
        }
    }

    #[test]
    fn does_not_split_multibyte_chars() {
        let line = format!("NOTE:{}", "日".repeat(40));
        let folded = fold_line(&line);

        let unfolded = folded.replace("\r\n ", "");
        assert_eq!(unfolded, line);
    }
}
