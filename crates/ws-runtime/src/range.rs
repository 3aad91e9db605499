use ws_core::{split_top_level, Environment, FeedbackLog};

use crate::eval::evaluate;

/// Resolve a `for` loop range expression. Only `range(a)`, `range(a, b)`,
/// and `range(a, b, c)` are recognized; arguments are evaluated and coerced
/// to integers. The sequence is materialized once with half-open semantics,
/// ascending for a positive step and descending for a negative one.
/// Problems report through `feedback` and produce an empty sequence.
pub fn parse_range(expr: &str, env: &Environment, feedback: &mut FeedbackLog) -> Vec<i64> {
    let trimmed = expr.trim();
    let inner = trimmed
        .strip_prefix("range(")
        .and_then(|rest| rest.strip_suffix(')'));
    let Some(inner) = inner else {
        feedback.push(format!("invalid range expression \"{}\"", trimmed));
        return Vec::new();
    };

    let args = split_top_level(inner, ',');
    let values: Vec<i64> = args
        .iter()
        .map(|arg| evaluate(arg, env, feedback).to_int())
        .collect();

    let (start, stop, step) = match values.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => {
            feedback.push(format!(
                "range() takes 1 to 3 arguments, got {}",
                values.len()
            ));
            return Vec::new();
        }
    };

    if step == 0 {
        feedback.push("range() step cannot be zero");
        return Vec::new();
    }

    let mut sequence = Vec::new();
    let mut value = start;
    loop {
        let in_range = if step > 0 { value < stop } else { value > stop };
        if !in_range {
            break;
        }
        sequence.push(value);
        // Bounds near the i64 edges end the sequence instead of wrapping.
        match value.checked_add(step) {
            Some(next) => value = next,
            None => break,
        }
    }
    sequence
}

#[cfg(test)]
mod range_tests {
    use super::*;

    fn resolve(expr: &str) -> (Vec<i64>, FeedbackLog) {
        let env = Environment::new();
        let mut feedback = FeedbackLog::new();
        let sequence = parse_range(expr, &env, &mut feedback);
        (sequence, feedback)
    }

    #[test]
    fn single_argument_counts_from_zero() {
        let (sequence, feedback) = resolve("range(4)");
        assert!(feedback.is_empty());
        assert_eq!(sequence, vec![0, 1, 2, 3]);
    }

    #[test]
    fn two_arguments_are_half_open() {
        let (sequence, _) = resolve("range(0, 5)");
        assert_eq!(sequence, vec![0, 1, 2, 3, 4]);
        let (empty, _) = resolve("range(3, 3)");
        assert!(empty.is_empty());
    }

    #[test]
    fn negative_step_descends() {
        let (sequence, _) = resolve("range(5, 0, -2)");
        assert_eq!(sequence, vec![5, 3, 1]);
    }

    #[test]
    fn arguments_are_evaluated_expressions() {
        let mut env = Environment::new();
        env.bind("n", ws_core::WsValue::Int(3));
        let mut feedback = FeedbackLog::new();
        let sequence = parse_range("range(1, n + 1)", &env, &mut feedback);
        assert_eq!(sequence, vec![1, 2, 3]);
    }

    #[test]
    fn zero_step_is_a_diagnostic_with_no_iteration() {
        let (sequence, feedback) = resolve("range(0, 5, 0)");
        assert!(sequence.is_empty());
        assert_eq!(feedback.len(), 1);
        assert!(feedback.messages()[0].contains("step"));
    }

    #[test]
    fn bounds_at_the_integer_edges_terminate_cleanly() {
        let (sequence, feedback) =
            resolve("range(9223372036854775805, 9223372036854775807, 3)");
        assert!(feedback.is_empty());
        assert_eq!(sequence, vec![i64::MAX - 2]);

        let (sequence, feedback) =
            resolve("range(-9223372036854775806, -9223372036854775808, -3)");
        assert!(feedback.is_empty());
        assert_eq!(sequence, vec![i64::MIN + 2]);
    }

    #[test]
    fn malformed_ranges_are_diagnostics() {
        let (sequence, feedback) = resolve("steps");
        assert!(sequence.is_empty());
        assert!(feedback.messages()[0].contains("invalid range"));

        let (sequence, feedback) = resolve("range(1, 2, 3, 4)");
        assert!(sequence.is_empty());
        assert!(feedback.messages()[0].contains("arguments"));

        let (sequence, feedback) = resolve("range()");
        assert!(sequence.is_empty());
        assert_eq!(feedback.len(), 1);
    }
}
