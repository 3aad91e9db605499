//! Single-line expression evaluation. Resolution walks a fixed rule list
//! and the binary operator search takes the first top-level occurrence of
//! each token in a fixed list order, not mathematical precedence — existing
//! programs depend on that scan order, so it is preserved as-is.

use ws_core::{find_top_level, split_top_level, Environment, FeedbackLog, WsValue};

/// Operator tokens in the order they are tried. `//`, `**`, and `not in`
/// are reached through their shorter prefixes and widened at the match
/// site.
const BINARY_OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "<", ">", " in ", " and ", " or ", "+", "-", "*", "/", "%", "**",
];

/// Evaluate an expression against the current environment. Never fails:
/// unrecognized input falls back to the trimmed text as a string literal.
/// Division by zero reports through `feedback` and yields `0`.
pub fn evaluate(expr: &str, env: &Environment, feedback: &mut FeedbackLog) -> WsValue {
    let trimmed = expr.trim();

    match trimmed {
        "True" | "true" => return WsValue::Bool(true),
        "False" | "false" => return WsValue::Bool(false),
        "None" | "null" => return WsValue::None,
        _ => {}
    }

    if let Some(inner) = string_literal(trimmed) {
        return WsValue::Str(inner.to_string());
    }

    if let Ok(value) = trimmed.parse::<i64>() {
        return WsValue::Int(value);
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return WsValue::Float(value);
    }

    if let Some(value) = env.get(trimmed) {
        return value.clone();
    }

    if trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() >= 2 {
        let elements = split_top_level(&trimmed[1..trimmed.len() - 1], ',')
            .iter()
            .map(|element| evaluate(element, env, feedback))
            .collect();
        return WsValue::List(elements);
    }

    if let Some((operator, left, right)) = split_binary(trimmed) {
        return apply_binary(operator, left, right, env, feedback);
    }

    if let Some(inner) = trimmed.strip_prefix("not ") {
        return WsValue::Bool(!evaluate_bool(inner, env, feedback));
    }

    if trimmed.starts_with('(') && trimmed.ends_with(')') && trimmed.len() >= 2 {
        return evaluate(&trimmed[1..trimmed.len() - 1], env, feedback);
    }

    WsValue::Str(trimmed.to_string())
}

pub fn evaluate_bool(expr: &str, env: &Environment, feedback: &mut FeedbackLog) -> bool {
    evaluate(expr, env, feedback).truthy()
}

fn string_literal(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    if (first == '"' || first == '\'') && text.len() >= 2 && text.ends_with(first) {
        return Some(&text[1..text.len() - 1]);
    }
    None
}

/// Find the operator that splits `text`: the first top-level occurrence of
/// each token, tried in `BINARY_OPERATORS` order. One-char prefixes widen
/// to `//` and `**`, and ` in ` preceded by a trailing `not` becomes the
/// `not in` form.
fn split_binary(text: &str) -> Option<(&'static str, &str, &str)> {
    for token in BINARY_OPERATORS {
        let Some(index) = find_top_level(text, token) else {
            continue;
        };

        match *token {
            "/" if text[index + 1..].starts_with('/') => {
                return Some(("//", &text[..index], &text[index + 2..]));
            }
            "*" if text[index + 1..].starts_with('*') => {
                return Some(("**", &text[..index], &text[index + 2..]));
            }
            " in " => {
                let left = text[..index].trim_end();
                if let Some(stripped) = left.strip_suffix("not") {
                    if stripped.is_empty() || stripped.ends_with(' ') {
                        return Some((" not in ", stripped, &text[index + token.len()..]));
                    }
                }
                return Some((" in ", &text[..index], &text[index + token.len()..]));
            }
            _ => {}
        }

        return Some((token, &text[..index], &text[index + token.len()..]));
    }
    None
}

fn apply_binary(
    operator: &str,
    left_text: &str,
    right_text: &str,
    env: &Environment,
    feedback: &mut FeedbackLog,
) -> WsValue {
    let left = evaluate(left_text, env, feedback);
    let right = evaluate(right_text, env, feedback);

    match operator {
        "==" => WsValue::Bool(left == right),
        "!=" => WsValue::Bool(left != right),
        "<=" => WsValue::Bool(left.to_float() <= right.to_float()),
        ">=" => WsValue::Bool(left.to_float() >= right.to_float()),
        "<" => WsValue::Bool(left.to_float() < right.to_float()),
        ">" => WsValue::Bool(left.to_float() > right.to_float()),
        " in " => WsValue::Bool(contains(&left, &right)),
        " not in " => WsValue::Bool(!contains(&left, &right)),
        // Both sides are always evaluated; there is no short-circuit.
        " and " => WsValue::Bool(left.truthy() && right.truthy()),
        " or " => WsValue::Bool(left.truthy() || right.truthy()),
        "+" => add(&left, &right),
        "-" => WsValue::Float(left.to_float() - right.to_float()),
        "*" => multiply(&left, &right),
        "/" => {
            let divisor = right.to_float();
            if divisor == 0.0 {
                feedback.push("Division by zero");
                WsValue::Int(0)
            } else {
                WsValue::Float(left.to_float() / divisor)
            }
        }
        "//" => {
            let divisor = right.to_float();
            if divisor == 0.0 {
                feedback.push("Division by zero");
                WsValue::Int(0)
            } else {
                WsValue::Float((left.to_float() / divisor).floor())
            }
        }
        "%" => {
            let divisor = right.to_float();
            if divisor == 0.0 {
                feedback.push("Modulo by zero");
                WsValue::Int(0)
            } else {
                WsValue::Float(left.to_float() % divisor)
            }
        }
        "**" => WsValue::Float(left.to_float().powf(right.to_float())),
        _ => WsValue::None,
    }
}

/// Membership: list membership by value equality, string substring
/// containment, `false` for anything else.
fn contains(left: &WsValue, right: &WsValue) -> bool {
    match right {
        WsValue::List(values) => values.iter().any(|value| value == left),
        WsValue::Str(text) => text.contains(&left.display_text()),
        _ => false,
    }
}

fn add(left: &WsValue, right: &WsValue) -> WsValue {
    if matches!(left, WsValue::Str(_)) || matches!(right, WsValue::Str(_)) {
        return WsValue::Str(format!("{}{}", left.display_text(), right.display_text()));
    }
    if let (WsValue::Int(left), WsValue::Int(right)) = (left, right) {
        return WsValue::Int(left + right);
    }
    WsValue::Float(left.to_float() + right.to_float())
}

fn multiply(left: &WsValue, right: &WsValue) -> WsValue {
    if let WsValue::Str(text) = left {
        return WsValue::Str(repeat_text(text, right.to_int()));
    }
    if let WsValue::Str(text) = right {
        return WsValue::Str(repeat_text(text, left.to_int()));
    }
    WsValue::Float(left.to_float() * right.to_float())
}

fn repeat_text(text: &str, count: i64) -> String {
    if count <= 0 {
        return String::new();
    }
    text.repeat(count as usize)
}
