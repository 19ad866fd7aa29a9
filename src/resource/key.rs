//! Key resource: schema and attribute mapping

use super::schema::{
    get_float, get_optional_string, get_string, get_string_list, Attributes, Field, FieldKind,
};
use super::Resource;
use crate::api::Key;
use crate::validation::Rule;
use serde_json::Value;

impl Resource for Key {
    const SCHEMA: &'static [Field] = &[
        Field::required("key_alias", FieldKind::String)
            .rules(&[Rule::NotEmpty, Rule::MinLength(3)])
            .force_new(),
        Field::required("team_id", FieldKind::String).rules(&[Rule::NotEmpty]),
        Field::optional("models", FieldKind::StringList).unordered(),
        Field::optional("max_budget", FieldKind::Float).rules(&[Rule::NON_NEGATIVE]),
        Field::optional("expires_at", FieldKind::String),
        Field::computed("key", FieldKind::String)
            .sensitive()
            .write_only(),
    ];

    fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("key_alias".into(), Value::String(self.key_alias.clone()));
        attrs.insert("team_id".into(), Value::String(self.team_id.clone()));
        if !self.models.is_empty() {
            attrs.insert(
                "models".into(),
                Value::Array(self.models.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(max_budget) = self.max_budget {
            attrs.insert("max_budget".into(), Value::from(max_budget));
        }
        if let Some(expires_at) = &self.expires_at {
            attrs.insert("expires_at".into(), Value::String(expires_at.clone()));
        }
        if let Some(key) = &self.key {
            attrs.insert("key".into(), Value::String(key.clone()));
        }
        attrs
    }

    fn from_attributes(attrs: &Attributes) -> Self {
        Self {
            key_alias: get_string(attrs, "key_alias"),
            team_id: get_string(attrs, "team_id"),
            models: get_string_list(attrs, "models"),
            max_budget: get_float(attrs, "max_budget"),
            expires_at: get_optional_string(attrs, "expires_at"),
            // never sent; the service generates it
            key: None,
        }
    }
}
