use serde::{Deserialize, Serialize};

/// Dynamically tagged runtime value. `Int` and `Float` together cover the
/// language's number type; every consumption site matches exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WsValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<WsValue>),
    None,
}

impl PartialEq for WsValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Numbers compare numerically regardless of tag, so `2 == 2.0`.
            (Self::Int(left), Self::Int(right)) => left == right,
            (Self::Int(left), Self::Float(right)) => (*left as f64) == *right,
            (Self::Float(left), Self::Int(right)) => *left == (*right as f64),
            (Self::Float(left), Self::Float(right)) => left == right,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Str(left), Self::Str(right)) => left == right,
            (Self::List(left), Self::List(right)) => left == right,
            (Self::None, Self::None) => true,
            _ => false,
        }
    }
}

impl WsValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::None => "none",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Truthiness: numbers are truthy iff nonzero, strings and lists iff
    /// non-empty, `None` is falsy.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::Str(value) => !value.is_empty(),
            Self::List(values) => !values.is_empty(),
            Self::None => false,
        }
    }

    pub fn to_float(&self) -> f64 {
        match self {
            Self::Bool(value) => {
                if *value {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Int(value) => *value as f64,
            Self::Float(value) => *value,
            Self::Str(value) => value.trim().parse::<f64>().unwrap_or(0.0),
            Self::List(_) | Self::None => 0.0,
        }
    }

    /// Integer coercion: floats truncate, booleans map to 0/1, numeric
    /// strings parse, anything else yields 0.
    pub fn to_int(&self) -> i64 {
        match self {
            Self::Bool(value) => {
                if *value {
                    1
                } else {
                    0
                }
            }
            Self::Int(value) => *value,
            Self::Float(value) => *value as i64,
            Self::Str(value) => {
                let trimmed = value.trim();
                if let Ok(parsed) = trimmed.parse::<i64>() {
                    parsed
                } else {
                    trimmed.parse::<f64>().map(|parsed| parsed as i64).unwrap_or(0)
                }
            }
            Self::List(_) | Self::None => 0,
        }
    }

    /// Display form used for command arguments and feedback text. Floats
    /// with a zero fraction print without the trailing `.0`.
    pub fn display_text(&self) -> String {
        match self {
            Self::Bool(value) => {
                if *value {
                    "True".to_string()
                } else {
                    "False".to_string()
                }
            }
            Self::Int(value) => value.to_string(),
            Self::Float(value) => float_text(*value),
            Self::Str(value) => value.clone(),
            Self::List(values) => {
                let inner = values
                    .iter()
                    .map(WsValue::display_text)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", inner)
            }
            Self::None => "None".to_string(),
        }
    }
}

fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
