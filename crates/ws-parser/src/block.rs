use std::sync::OnceLock;

use regex::Regex;
use ws_core::{split_top_level, FeedbackLog, IfBranch, Statement};

use crate::lines::{split_logical_lines, LogicalLine, INDENT_UNIT};

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex must compile")
    })
}

fn is_identifier(text: &str) -> bool {
    identifier_regex().is_match(text)
}

/// Parse a whole program. Syntax problems become feedback diagnostics and
/// parsing recovers past the offending line; the returned tree contains
/// every statement that parsed cleanly.
pub fn parse_program(source: &str, feedback: &mut FeedbackLog) -> Vec<Statement> {
    let lines = split_logical_lines(source);
    let mut cursor = 0usize;
    parse_block(&lines, &mut cursor, 0, feedback)
}

/// Parse a run of lines at exactly `expected_indent`, advancing `cursor`.
/// A shallower line ends the block without being consumed; a deeper line is
/// an indentation diagnostic and is skipped.
pub fn parse_block(
    lines: &[LogicalLine],
    cursor: &mut usize,
    expected_indent: usize,
    feedback: &mut FeedbackLog,
) -> Vec<Statement> {
    let mut statements = Vec::new();

    while *cursor < lines.len() {
        let line = lines[*cursor].clone();
        if line.indent < expected_indent {
            break;
        }
        if line.indent > expected_indent {
            feedback.push_line(line.number, "unexpected indentation");
            *cursor += 1;
            continue;
        }

        if line.text.starts_with("if ") {
            if let Some(statement) =
                parse_if_chain(lines, cursor, expected_indent, &line, feedback)
            {
                statements.push(statement);
            }
        } else if line.text.starts_with("while ") {
            if let Some(statement) = parse_while(lines, cursor, expected_indent, &line, feedback) {
                statements.push(statement);
            }
        } else if line.text.starts_with("for ") {
            if let Some(statement) = parse_for(lines, cursor, expected_indent, &line, feedback) {
                statements.push(statement);
            }
        } else if let Some(eq_index) = find_assignment_eq(&line.text) {
            *cursor += 1;
            if let Some(statement) = parse_assignment(&line, eq_index, feedback) {
                statements.push(statement);
            }
        } else if line.text.contains('(') && line.text.contains(')') {
            *cursor += 1;
            if let Some(statement) = parse_function_call(&line, feedback) {
                statements.push(statement);
            }
        } else {
            feedback.push_line(line.number, format!("invalid statement \"{}\"", line.text));
            *cursor += 1;
        }
    }

    statements
}

/// Byte offset of an `=` that is not part of `==`, `!=`, `<=`, or `>=`,
/// ignoring string literal interiors.
fn find_assignment_eq(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (index, ch) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
            }
            prev = Some(ch);
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '=' => {
                let next_is_eq = text[index + ch.len_utf8()..].starts_with('=');
                let part_of_comparison =
                    matches!(prev, Some('=') | Some('!') | Some('<') | Some('>')) || next_is_eq;
                if !part_of_comparison {
                    return Some(index);
                }
            }
            _ => {}
        }
        prev = Some(ch);
    }
    None
}

fn parse_assignment(
    line: &LogicalLine,
    eq_index: usize,
    feedback: &mut FeedbackLog,
) -> Option<Statement> {
    let name = line.text[..eq_index].trim();
    let expression = line.text[eq_index + 1..].trim();
    if !is_identifier(name) {
        feedback.push_line(line.number, format!("invalid assignment \"{}\"", line.text));
        return None;
    }

    Some(Statement::Assignment {
        line: line.number,
        name: name.to_string(),
        expression: expression.to_string(),
    })
}

fn parse_function_call(line: &LogicalLine, feedback: &mut FeedbackLog) -> Option<Statement> {
    let open = line.text.find('(')?;
    let close = line.text.rfind(')')?;
    let name = line.text[..open].trim();
    if close < open || !is_identifier(name) {
        feedback.push_line(
            line.number,
            format!("invalid function call \"{}\"", line.text),
        );
        return None;
    }

    let args = split_top_level(&line.text[open + 1..close], ',');
    Some(Statement::FunctionCall {
        line: line.number,
        name: name.to_string(),
        args,
    })
}

/// Inner text of a compound header such as `while COND:`. Reports and
/// consumes the line when the trailing `:` is missing.
fn compound_header(
    line: &LogicalLine,
    keyword: &str,
    feedback: &mut FeedbackLog,
) -> Option<String> {
    if !line.text.ends_with(':') {
        feedback.push_line(
            line.number,
            format!("expected \":\" at end of {} statement", keyword),
        );
        return None;
    }
    let inner = &line.text[keyword.len() + 1..line.text.len() - 1];
    Some(inner.trim().to_string())
}

fn parse_while(
    lines: &[LogicalLine],
    cursor: &mut usize,
    expected_indent: usize,
    line: &LogicalLine,
    feedback: &mut FeedbackLog,
) -> Option<Statement> {
    *cursor += 1;
    let condition = compound_header(line, "while", feedback)?;
    let body = parse_block(lines, cursor, expected_indent + INDENT_UNIT, feedback);
    Some(Statement::While {
        line: line.number,
        condition,
        body,
    })
}

fn parse_for(
    lines: &[LogicalLine],
    cursor: &mut usize,
    expected_indent: usize,
    line: &LogicalLine,
    feedback: &mut FeedbackLog,
) -> Option<Statement> {
    *cursor += 1;
    let header = compound_header(line, "for", feedback)?;
    let Some(in_index) = ws_core::find_top_level(&header, " in ") else {
        feedback.push_line(line.number, format!("invalid for statement \"{}\"", line.text));
        return None;
    };

    let iterator = header[..in_index].trim().to_string();
    let range = header[in_index + " in ".len()..].trim().to_string();
    if !is_identifier(&iterator) {
        feedback.push_line(
            line.number,
            format!("invalid for iterator \"{}\"", iterator),
        );
        return None;
    }

    let body = parse_block(lines, cursor, expected_indent + INDENT_UNIT, feedback);
    Some(Statement::For {
        line: line.number,
        iterator,
        range,
        body,
    })
}

/// Parse `if COND:` plus any `elif`/`else` arms at the same indentation.
/// A non-chain line at that indentation ends the chain unconsumed.
fn parse_if_chain(
    lines: &[LogicalLine],
    cursor: &mut usize,
    expected_indent: usize,
    line: &LogicalLine,
    feedback: &mut FeedbackLog,
) -> Option<Statement> {
    *cursor += 1;
    let condition = compound_header(line, "if", feedback)?;
    let block = parse_block(lines, cursor, expected_indent + INDENT_UNIT, feedback);
    let mut branches = vec![IfBranch { condition, block }];
    let mut else_block = None;

    while *cursor < lines.len() {
        let next = lines[*cursor].clone();
        if next.indent != expected_indent {
            break;
        }

        if next.text.starts_with("elif ") {
            *cursor += 1;
            let Some(condition) = compound_header(&next, "elif", feedback) else {
                break;
            };
            let block = parse_block(lines, cursor, expected_indent + INDENT_UNIT, feedback);
            branches.push(IfBranch { condition, block });
        } else if next.text == "else:" {
            *cursor += 1;
            else_block = Some(parse_block(
                lines,
                cursor,
                expected_indent + INDENT_UNIT,
                feedback,
            ));
            break;
        } else {
            break;
        }
    }

    Some(Statement::If {
        line: line.number,
        branches,
        else_block,
    })
}

#[cfg(test)]
mod block_tests {
    use super::*;

    fn parse(source: &str) -> (Vec<Statement>, FeedbackLog) {
        let mut feedback = FeedbackLog::new();
        let statements = parse_program(source, &mut feedback);
        (statements, feedback)
    }

    #[test]
    fn parses_assignment_and_call() {
        let (statements, feedback) = parse("x = 1 + 2\nmove(\"east\", 3)\n");
        assert!(feedback.is_empty());
        assert_eq!(
            statements,
            vec![
                Statement::Assignment {
                    line: 1,
                    name: "x".to_string(),
                    expression: "1 + 2".to_string(),
                },
                Statement::FunctionCall {
                    line: 2,
                    name: "move".to_string(),
                    args: vec!["\"east\"".to_string(), "3".to_string()],
                },
            ]
        );
    }

    #[test]
    fn comparison_lines_are_not_assignments() {
        let (statements, feedback) = parse("check(a == b)\n");
        assert!(feedback.is_empty());
        assert!(matches!(
            statements.as_slice(),
            [Statement::FunctionCall { name, .. }] if name == "check"
        ));
    }

    #[test]
    fn call_arguments_split_only_on_top_level_commas() {
        let (statements, _) = parse("say(\"a, b\", pick(1, 2), [3, 4])\n");
        let Statement::FunctionCall { args, .. } = &statements[0] else {
            panic!("expected a function call");
        };
        assert_eq!(args, &["\"a, b\"", "pick(1, 2)", "[3, 4]"]);
    }

    #[test]
    fn parses_full_if_elif_else_chain() {
        let source = "\
if a == 1:
    first()
elif a == 2:
    second()
else:
    third()
after()
";
        let (statements, feedback) = parse(source);
        assert!(feedback.is_empty());
        assert_eq!(statements.len(), 2);
        let Statement::If {
            branches,
            else_block,
            ..
        } = &statements[0]
        else {
            panic!("expected an if chain");
        };
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].condition, "a == 1");
        assert_eq!(branches[1].condition, "a == 2");
        assert_eq!(else_block.as_ref().map(Vec::len), Some(1));
        assert_eq!(statements[1].line(), 7);
    }

    #[test]
    fn nested_blocks_use_four_column_steps() {
        let source = "\
while x < 3:
    for i in range(2):
        tick(i)
    x = x + 1
";
        let (statements, feedback) = parse(source);
        assert!(feedback.is_empty());
        let Statement::While { body, .. } = &statements[0] else {
            panic!("expected a while loop");
        };
        assert_eq!(body.len(), 2);
        assert!(matches!(body[0], Statement::For { .. }));
        assert!(matches!(body[1], Statement::Assignment { .. }));
    }

    #[test]
    fn deeper_indentation_is_a_recoverable_diagnostic() {
        let (statements, feedback) = parse("a = 1\n        b = 2\nc = 3\n");
        assert_eq!(statements.len(), 2);
        assert_eq!(feedback.len(), 1);
        assert!(feedback.messages()[0].contains("Line 2"));
        assert!(feedback.messages()[0].contains("unexpected indentation"));
    }

    #[test]
    fn missing_colon_consumes_header_and_recovers() {
        let source = "\
while x < 3
    tick()
after()
";
        let (statements, feedback) = parse(source);
        assert!(feedback
            .messages()
            .iter()
            .any(|message| message.contains("expected \":\"")));
        // The malformed loop is dropped; `after()` still parses.
        assert!(statements
            .iter()
            .any(|statement| matches!(statement, Statement::FunctionCall { name, .. } if name == "after")));
    }

    #[test]
    fn unrecognized_lines_are_diagnostics() {
        let (statements, feedback) = parse("just some words\n");
        assert!(statements.is_empty());
        assert_eq!(feedback.len(), 1);
        assert!(feedback.messages()[0].contains("invalid statement"));
    }

    #[test]
    fn parsing_twice_yields_identical_trees() {
        let source = "\
total = 0
for i in range(0, 5):
    if i % 2 == 0:
        total = total + i
report(total)
";
        let (first, _) = parse(source);
        let (second, _) = parse(source);
        assert_eq!(first, second);
    }
}
