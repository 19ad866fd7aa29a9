//! Field validators
//!
//! Pure predicates over a declared attribute value. Every rule attached to a
//! field is evaluated and every violation is reported, so one failed apply
//! lists all problems at once.

use serde_json::Value;

/// A single constraint on a declared value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// String must not be empty
    NotEmpty,
    /// String must have at least this many characters
    MinLength(usize),
    /// Number must be >= this bound
    FloatAtLeast(f64),
    /// String must be one of these values
    OneOf(&'static [&'static str]),
}

impl Rule {
    /// Float bound with the default minimum of 0
    pub const NON_NEGATIVE: Rule = Rule::FloatAtLeast(0.0);

    /// Check `value` of field `key`, returning a violation message on failure
    pub fn check(&self, key: &str, value: &Value) -> Option<String> {
        match *self {
            Rule::NotEmpty => match value.as_str() {
                Some("") => Some(format!("{} cannot be empty", key)),
                Some(_) => None,
                None => Some(expected_type(key, "string")),
            },
            Rule::MinLength(min) => match value.as_str() {
                Some(s) if s.chars().count() < min => {
                    Some(format!("{} must be at least {} characters", key, min))
                }
                Some(_) => None,
                None => Some(expected_type(key, "string")),
            },
            Rule::FloatAtLeast(min) => match value.as_f64() {
                Some(v) if v < min => Some(format!("{} cannot be less than {}", key, min)),
                Some(_) => None,
                None => Some(expected_type(key, "number")),
            },
            Rule::OneOf(valid) => match value.as_str() {
                Some(s) if valid.contains(&s) => None,
                Some(s) => Some(format!(
                    "expected {} to be one of [{}], got {}",
                    key,
                    valid.join(", "),
                    s
                )),
                None => Some(expected_type(key, "string")),
            },
        }
    }
}

pub(crate) fn expected_type(key: &str, ty: &str) -> String {
    format!("expected type of {} to be {}", key, ty)
}

/// Run every rule against one value, collecting all violations
pub fn check_all(key: &str, value: &Value, rules: &[Rule]) -> Vec<String> {
    rules.iter().filter_map(|rule| rule.check(key, value)).collect()
}

/// Convenience wrapper for a string value
pub fn validate_str(key: &str, value: &str, rules: &[Rule]) -> Vec<String> {
    check_all(key, &Value::String(value.to_string()), rules)
}
