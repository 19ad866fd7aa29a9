//! Model resource: schema and attribute mapping

use super::schema::{
    get_optional_string, get_string, get_string_map, string_map_value, Attributes, Field,
    FieldKind,
};
use super::Resource;
use crate::api::{Model, ModelProvider};
use crate::validation::Rule;
use serde_json::Value;

impl Resource for Model {
    const SCHEMA: &'static [Field] = &[
        Field::required("name", FieldKind::String)
            .rules(&[Rule::NotEmpty, Rule::MinLength(3)])
            .force_new(),
        Field::required("model_provider", FieldKind::String)
            .rules(&[Rule::OneOf(ModelProvider::NAMES)]),
        Field::required("model_name", FieldKind::String).rules(&[Rule::NotEmpty]),
        Field::optional("api_base", FieldKind::String),
        Field::optional("api_key", FieldKind::String)
            .sensitive()
            .write_only(),
        Field::optional("metadata", FieldKind::StringMap),
    ];

    fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("name".into(), Value::String(self.name.clone()));
        attrs.insert(
            "model_provider".into(),
            Value::String(self.model_provider.clone()),
        );
        attrs.insert("model_name".into(), Value::String(self.model_name.clone()));
        if let Some(api_base) = &self.api_base {
            attrs.insert("api_base".into(), Value::String(api_base.clone()));
        }
        if let Some(api_key) = &self.api_key {
            attrs.insert("api_key".into(), Value::String(api_key.clone()));
        }
        if !self.metadata.is_empty() {
            attrs.insert("metadata".into(), string_map_value(&self.metadata));
        }
        attrs
    }

    fn from_attributes(attrs: &Attributes) -> Self {
        Self {
            name: get_string(attrs, "name"),
            model_provider: get_string(attrs, "model_provider"),
            model_name: get_string(attrs, "model_name"),
            api_base: get_optional_string(attrs, "api_base"),
            api_key: get_optional_string(attrs, "api_key"),
            metadata: get_string_map(attrs, "metadata"),
        }
    }
}
