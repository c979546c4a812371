//! Numbered-lines fixtures for line-reading tests.

use std::io::{self, Write};

/// Width of each zero-padded line number.
pub const LINE_WIDTH: usize = 8;

/// Write lines `00000001` through `count`.
///
/// Every line ends with `\n` except the last when `trailing_newline` is false.
pub fn write_numbered_lines<W: Write>(out: &mut W, count: u64, trailing_newline: bool) -> io::Result<()> {
    for n in 1..=count {
        if n < count || trailing_newline {
            writeln!(out, "{:0width$}", n, width = LINE_WIDTH)?;
        } else {
            write!(out, "{:0width$}", n, width = LINE_WIDTH)?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(count: u64, trailing_newline: bool) -> String {
        let mut out = Vec::new();
        write_numbered_lines(&mut out, count, trailing_newline).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_lines_with_newline() {
        assert_eq!(render(3, true), "00000001\n00000002\n00000003\n");
    }

    #[test]
    fn test_lines_without_final_newline() {
        assert_eq!(render(3, false), "00000001\n00000002\n00000003");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(render(1, false), "00000001");
        assert_eq!(render(1, true), "00000001\n");
    }

    #[test]
    fn test_zero_lines() {
        assert_eq!(render(0, true), "");
    }

    #[test]
    fn test_ten_thousand_lines() {
        let text = render(10_000, true);
        assert_eq!(text.len(), 10_000 * 9);
        assert!(text.ends_with("00010000\n"));
        assert_eq!(text.lines().count(), 10_000);
    }
}
