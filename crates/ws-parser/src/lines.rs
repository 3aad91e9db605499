/// One indentation level in columns. A literal tab counts as a full unit.
pub const INDENT_UNIT: usize = 4;

/// A non-blank, non-comment source line with its indentation measured in
/// columns and its 1-based position in the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub number: usize,
    pub indent: usize,
    pub text: String,
}

/// Split raw program text into logical lines. Blank lines and `#` comment
/// lines are dropped without affecting indentation tracking.
pub fn split_logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut indent = 0usize;
        for ch in raw.chars() {
            match ch {
                ' ' => indent += 1,
                '\t' => indent += INDENT_UNIT,
                _ => break,
            }
        }

        lines.push(LogicalLine {
            number: index + 1,
            indent,
            text: trimmed.to_string(),
        });
    }
    lines
}

#[cfg(test)]
mod lines_tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let source = "a = 1\n\n# a comment\n  # indented comment\nb = 2\n";
        let lines = split_logical_lines(source);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[0].text, "a = 1");
        assert_eq!(lines[1].number, 5);
        assert_eq!(lines[1].text, "b = 2");
    }

    #[test]
    fn tabs_count_as_one_indent_unit() {
        let source = "if x:\n\tmove()\n        jump()\n";
        let lines = split_logical_lines(source);
        assert_eq!(lines[0].indent, 0);
        assert_eq!(lines[1].indent, INDENT_UNIT);
        assert_eq!(lines[2].indent, 2 * INDENT_UNIT);
    }
}
