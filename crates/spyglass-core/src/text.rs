//! Text position utilities for byte offset and line:column conversions.
//!
//! Lines and columns are 1-indexed (matching editor conventions); byte
//! offsets are 0-indexed. Columns count Unicode scalar values, not bytes.

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
///
/// If `offset` exceeds the content length, returns the position at the end.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;
    let mut current = 0usize;

    for ch in content.chars() {
        if current >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
        current += ch.len_utf8();
    }

    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_to_position_simple() {
        let content = "line1\nline2\nline3\n";
        assert_eq!(byte_offset_to_position(content, 0), (1, 1));
        assert_eq!(byte_offset_to_position(content, 4), (1, 5));
        assert_eq!(byte_offset_to_position(content, 6), (2, 1));
        assert_eq!(byte_offset_to_position(content, 12), (3, 1));
    }

    #[test]
    fn offset_beyond_content() {
        let (line, col) = byte_offset_to_position("short", 100);
        assert_eq!((line, col), (1, 6));
    }

    #[test]
    fn multibyte_columns_count_chars() {
        let content = "héllo";
        // 'é' is two bytes; offset 3 is after 'h' and 'é'.
        assert_eq!(byte_offset_to_position(content, 3), (1, 3));
    }

}
