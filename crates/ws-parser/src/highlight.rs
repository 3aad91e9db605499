use std::sync::OnceLock;

use regex::Regex;

const COMMENT_COLOR: &str = "#5c6370";
const STRING_COLOR: &str = "#98c379";
const NUMBER_COLOR: &str = "#d19a66";
const KEYWORD_COLOR: &str = "#c678dd";

fn token_regex() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| {
        Regex::new(
            r#"(?x)
            (?P<comment>\#[^\n]*)
          | (?P<string>"[^"\n]*"?|'[^'\n]*'?)
          | (?P<keyword>\b(?:if|elif|else|while|for|in|not|and|or|range|True|true|False|false|None|null)\b)
          | (?P<number>\b\d+(?:\.\d+)?\b)
            "#,
        )
        .expect("highlight regex must compile")
    })
}

/// Pure text-to-markup pass for the host's rich-text renderer: wraps
/// comments, strings, keywords, and numbers in `[color=...]` tags. Never
/// fails; unrecognized text passes through untouched.
pub fn highlight(source: &str) -> String {
    let regex = token_regex();
    let mut output = String::new();
    let mut last_index = 0usize;

    for captures in regex.captures_iter(source) {
        let full = captures
            .get(0)
            .expect("capture group 0 must exist for each regex capture");
        output.push_str(&source[last_index..full.start()]);

        let color = if captures.name("comment").is_some() {
            COMMENT_COLOR
        } else if captures.name("string").is_some() {
            STRING_COLOR
        } else if captures.name("keyword").is_some() {
            KEYWORD_COLOR
        } else {
            NUMBER_COLOR
        };
        output.push_str(&format!("[color={}]{}[/color]", color, full.as_str()));
        last_index = full.end();
    }

    output.push_str(&source[last_index..]);
    output
}
