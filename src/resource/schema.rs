//! Resource schemas and the flat attribute representation
//!
//! Each resource kind declares a static table of [`Field`]s. The table drives
//! validation of declared attributes, refresh after reads (write-only fields
//! survive), replacement detection and drift comparison.

use crate::error::{Error, Result};
use crate::validation::{check_all, expected_type, Rule};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Flat attribute set exchanged with the configuration front-end
pub type Attributes = BTreeMap<String, Value>;

/// Value shape of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Float,
    StringList,
    StringMap,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Float => value.is_number(),
            FieldKind::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldKind::StringMap => value
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string)),
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Float => "number",
            FieldKind::StringList => "list of strings",
            FieldKind::StringMap => "map of strings",
        }
    }
}

/// Who sets a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Set by the service only
    Computed,
}

/// Schema entry for one attribute
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    pub rules: &'static [Rule],
    /// Changing the value requires destroying and recreating the resource
    pub force_new: bool,
    /// Redacted in operator-facing output
    pub sensitive: bool,
    /// Never returned by reads; the last known value is kept on refresh
    pub write_only: bool,
    /// List order does not matter for equality
    pub unordered: bool,
}

impl Field {
    const fn new(name: &'static str, kind: FieldKind, presence: Presence) -> Self {
        Self {
            name,
            kind,
            presence,
            rules: &[],
            force_new: false,
            sensitive: false,
            write_only: false,
            unordered: false,
        }
    }

    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Required)
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Optional)
    }

    pub const fn computed(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Computed)
    }

    pub const fn rules(mut self, rules: &'static [Rule]) -> Self {
        self.rules = rules;
        self
    }

    pub const fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub const fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub const fn unordered(mut self) -> Self {
        self.unordered = true;
        self
    }
}

/// Look up a field by name
pub fn field<'s>(schema: &'s [Field], name: &str) -> Option<&'s Field> {
    schema.iter().find(|f| f.name == name)
}

/// Validate declared attributes against a schema, reporting every violation
pub fn validate(schema: &[Field], declared: &Attributes) -> Result<()> {
    let mut violations = Vec::new();

    for (key, value) in declared {
        match field(schema, key) {
            None => violations.push(format!("unsupported argument \"{}\"", key)),
            Some(f) if f.presence == Presence::Computed && !value.is_null() => {
                violations.push(format!("{} is computed and cannot be set", key))
            }
            Some(_) => {}
        }
    }

    for f in schema {
        if f.presence == Presence::Computed {
            continue;
        }
        match declared.get(f.name).filter(|v| !v.is_null()) {
            None if f.presence == Presence::Required => {
                violations.push(format!("{} is required", f.name))
            }
            None => {}
            Some(value) if !f.kind.matches(value) => {
                violations.push(expected_type(f.name, f.kind.type_name()))
            }
            Some(value) => violations.extend(check_all(f.name, value, f.rules)),
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::debug!("Validation failed: {:?}", violations);
        Err(Error::Validation(violations))
    }
}

/// Attributes after a successful read: everything comes from `fresh` except
/// write-only fields, which keep their `prior` value.
pub fn refresh(schema: &[Field], prior: &Attributes, fresh: &Attributes) -> Attributes {
    let mut out = Attributes::new();
    for f in schema {
        let source = if f.write_only { prior } else { fresh };
        if let Some(value) = source.get(f.name).filter(|v| !is_blank(v)) {
            out.insert(f.name.to_string(), value.clone());
        }
    }
    out
}

/// Attributes after an update was sent: declared values for settable fields,
/// prior values for computed ones.
pub fn merge_declared(schema: &[Field], prior: &Attributes, declared: &Attributes) -> Attributes {
    let mut out = Attributes::new();
    for f in schema {
        let source = if f.presence == Presence::Computed {
            prior
        } else {
            declared
        };
        if let Some(value) = source.get(f.name).filter(|v| !is_blank(v)) {
            out.insert(f.name.to_string(), value.clone());
        }
    }
    out
}

/// Force-new fields whose declared value differs from the recorded one.
/// A field with no recorded value is not compared.
pub fn requires_replacement(
    schema: &[Field],
    prior: &Attributes,
    declared: &Attributes,
) -> Vec<&'static str> {
    schema
        .iter()
        .filter(|f| f.force_new)
        .filter(|f| prior.get(f.name).is_some_and(|v| !is_blank(v)))
        .filter(|f| !values_equal(f, prior.get(f.name), declared.get(f.name)))
        .map(|f| f.name)
        .collect()
}

/// Fields whose materialized value no longer matches the declaration.
///
/// Write-only and computed fields are skipped since reads cannot observe
/// them. An unset optional equals its empty value.
pub fn detect_drift(schema: &[Field], declared: &Attributes, actual: &Attributes) -> Vec<&'static str> {
    schema
        .iter()
        .filter(|f| !f.write_only && f.presence != Presence::Computed)
        .filter(|f| !values_equal(f, declared.get(f.name), actual.get(f.name)))
        .map(|f| f.name)
        .collect()
}

/// Copy of `attrs` with sensitive values masked, for display
pub fn redact(schema: &[Field], attrs: &Attributes) -> Attributes {
    attrs
        .iter()
        .map(|(k, v)| {
            let masked = field(schema, k).is_some_and(|f| f.sensitive) && !is_blank(v);
            let value = if masked {
                Value::String("(sensitive)".to_string())
            } else {
                v.clone()
            };
            (k.clone(), value)
        })
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn values_equal(f: &Field, a: Option<&Value>, b: Option<&Value>) -> bool {
    let a = a.filter(|v| !is_blank(v));
    let b = b.filter(|v| !is_blank(v));
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => match f.kind {
            FieldKind::Float => a.as_f64() == b.as_f64(),
            FieldKind::StringList if f.unordered => sorted_strings(a) == sorted_strings(b),
            _ => a == b,
        },
        _ => false,
    }
}

fn sorted_strings(value: &Value) -> Vec<&str> {
    let mut items: Vec<&str> = value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    items.sort_unstable();
    items
}

// =========================================================================
// Typed accessors, used when mapping attributes onto records
// =========================================================================

pub fn get_string(attrs: &Attributes, name: &str) -> String {
    attrs
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Optional string; empty counts as unset
pub fn get_optional_string(attrs: &Attributes, name: &str) -> Option<String> {
    attrs
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn get_float(attrs: &Attributes, name: &str) -> Option<f64> {
    attrs.get(name).and_then(Value::as_f64)
}

pub fn get_string_list(attrs: &Attributes, name: &str) -> Vec<String> {
    attrs
        .get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn get_string_map(attrs: &Attributes, name: &str) -> BTreeMap<String, String> {
    attrs
        .get(name)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

pub fn string_map_value(map: &BTreeMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<String, Value>>(),
    )
}
