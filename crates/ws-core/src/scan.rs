//! Top-level text scanning shared by the argument splitter and the
//! expression evaluator. "Top level" means outside single/double-quoted
//! strings and outside any `(`/`)` or `[`/`]` nesting.

#[derive(Debug, Default)]
struct ScanState {
    quote: Option<char>,
    escaped: bool,
    paren_depth: usize,
    bracket_depth: usize,
}

impl ScanState {
    fn at_top_level(&self) -> bool {
        self.quote.is_none() && self.paren_depth == 0 && self.bracket_depth == 0
    }

    fn advance(&mut self, ch: char) {
        if let Some(open) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == open {
                self.quote = None;
            }
            return;
        }
        match ch {
            '\'' | '"' => self.quote = Some(ch),
            '(' => self.paren_depth += 1,
            ')' => self.paren_depth = self.paren_depth.saturating_sub(1),
            '[' => self.bracket_depth += 1,
            ']' => self.bracket_depth = self.bracket_depth.saturating_sub(1),
            _ => {}
        }
    }
}

/// Split `text` on `separator` occurrences at the top level, trimming each
/// piece. Commas inside string literals, nested calls, or list literals
/// never split. An all-whitespace input yields no pieces.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    let mut state = ScanState::default();
    let mut current = String::new();
    for ch in text.chars() {
        if ch == separator && state.at_top_level() {
            pieces.push(current.trim().to_string());
            current.clear();
            continue;
        }
        state.advance(ch);
        current.push(ch);
    }
    pieces.push(current.trim().to_string());
    pieces
}

/// Byte offset of the first top-level occurrence of `token` in `text`.
pub fn find_top_level(text: &str, token: &str) -> Option<usize> {
    if token.is_empty() {
        return None;
    }

    let mut state = ScanState::default();
    for (index, ch) in text.char_indices() {
        if state.at_top_level() && text[index..].starts_with(token) {
            return Some(index);
        }
        state.advance(ch);
    }
    None
}

#[cfg(test)]
mod scan_tests {
    use super::*;

    #[test]
    fn split_ignores_commas_inside_strings_and_nesting() {
        assert_eq!(
            split_top_level(r#""a,b", f(1, 2), [3, 4], c"#, ','),
            vec![r#""a,b""#, "f(1, 2)", "[3, 4]", "c"]
        );
    }

    #[test]
    fn split_of_blank_text_yields_nothing() {
        assert!(split_top_level("   ", ',').is_empty());
        assert_eq!(split_top_level("x", ','), vec!["x"]);
    }

    #[test]
    fn split_respects_escaped_quotes() {
        assert_eq!(
            split_top_level(r#""a\",b", c"#, ','),
            vec![r#""a\",b""#, "c"]
        );
    }

    #[test]
    fn find_skips_strings_and_parens() {
        assert_eq!(find_top_level(r#""1 + 2" + 3"#, "+"), Some(8));
        assert_eq!(find_top_level("(1 + 2) * 3", "+"), None);
        assert_eq!(find_top_level("(1 + 2) * 3", "*"), Some(8));
        assert_eq!(find_top_level("[1 + 2]", "+"), None);
        assert_eq!(find_top_level("a in b", " in "), Some(1));
    }
}
