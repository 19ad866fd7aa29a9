//! Property-based tests using proptest
//!
//! These tests check the schema validators and drift comparison against
//! randomized declarations.

use llmctl::api::{Key, Model, ModelProvider};
use llmctl::resource::schema::{detect_drift, redact, validate};
use llmctl::resource::{Attributes, Resource};
use llmctl::Error;
use proptest::prelude::*;
use serde_json::{json, Value};

fn attrs(value: Value) -> Attributes {
    serde_json::from_value(value).unwrap()
}

fn violations(result: llmctl::Result<()>) -> Vec<String> {
    match result {
        Ok(()) => Vec::new(),
        Err(Error::Validation(v)) => v,
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

/// Generate a valid key declaration
fn arb_key() -> impl Strategy<Value = Attributes> {
    (
        "[a-z][a-z0-9-]{2,40}", // key_alias
        "[a-z0-9]{1,12}",       // team_id
        prop::collection::vec("[a-z0-9-]{1,16}", 0..5),
        prop::option::of(0.0f64..1_000_000.0),
    )
        .prop_map(|(alias, team, models, budget)| {
            let mut declared = attrs(json!({
                "key_alias": alias,
                "team_id": team,
                "models": models,
            }));
            if let Some(budget) = budget {
                declared.insert("max_budget".into(), json!(budget));
            }
            declared
        })
}

fn arb_provider() -> impl Strategy<Value = ModelProvider> {
    prop::sample::select(ModelProvider::ALL)
}

proptest! {
    #[test]
    fn valid_keys_pass(declared in arb_key()) {
        prop_assert!(validate(Key::SCHEMA, &declared).is_ok());
    }

    #[test]
    fn short_alias_always_rejected(alias in "[a-z0-9]{1,2}") {
        let declared = attrs(json!({"key_alias": alias, "team_id": "t1"}));
        prop_assert_eq!(
            violations(validate(Key::SCHEMA, &declared)),
            vec!["key_alias must be at least 3 characters".to_string()]
        );
    }

    /// Length is counted in characters, not bytes
    #[test]
    fn multibyte_alias_counts_chars(alias in "[é日ß]{3,6}") {
        let declared = attrs(json!({"key_alias": alias, "team_id": "t1"}));
        prop_assert!(validate(Key::SCHEMA, &declared).is_ok());
    }

    #[test]
    fn negative_budget_always_rejected(budget in -1_000_000.0f64..-0.0001) {
        let declared = attrs(json!({"key_alias": "abc", "team_id": "t1", "max_budget": budget}));
        prop_assert_eq!(
            violations(validate(Key::SCHEMA, &declared)),
            vec!["max_budget cannot be less than 0".to_string()]
        );
    }

    #[test]
    fn known_providers_accepted(provider in arb_provider()) {
        let declared = attrs(json!({
            "name": "gpt-test",
            "model_provider": provider.as_str(),
            "model_name": "m",
        }));
        prop_assert!(validate(Model::SCHEMA, &declared).is_ok());
    }

    #[test]
    fn unknown_providers_rejected(provider in "[a-z]{1,12}") {
        prop_assume!(!ModelProvider::NAMES.contains(&provider.as_str()));
        let declared = attrs(json!({
            "name": "gpt-test",
            "model_provider": provider,
            "model_name": "m",
        }));
        let found = violations(validate(Model::SCHEMA, &declared));
        prop_assert_eq!(found.len(), 1);
        prop_assert!(found[0].starts_with("expected model_provider to be one of"));
    }

    /// Every broken field is reported, not just the first
    #[test]
    fn all_violations_reported(
        short_alias in prop::bool::ANY,
        empty_team in prop::bool::ANY,
        negative in prop::bool::ANY,
    ) {
        let declared = attrs(json!({
            "key_alias": if short_alias { "ab" } else { "abc" },
            "team_id": if empty_team { "" } else { "t1" },
            "max_budget": if negative { -1.0 } else { 1.0 },
        }));
        let expected = [short_alias, empty_team, negative].iter().filter(|b| **b).count();
        prop_assert_eq!(violations(validate(Key::SCHEMA, &declared)).len(), expected);
    }

    /// Model order is not drift
    #[test]
    fn reordered_models_not_drift(
        (models, shuffled) in prop::collection::vec("[a-z0-9-]{1,16}", 0..8)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let declared = attrs(json!({"key_alias": "abc", "team_id": "t1", "models": models}));
        let actual = attrs(json!({"key_alias": "abc", "team_id": "t1", "models": shuffled}));
        prop_assert!(detect_drift(Key::SCHEMA, &declared, &actual).is_empty());
    }

    /// Integer and float spellings of a budget compare equal
    #[test]
    fn budget_number_forms_not_drift(budget in 0u32..1_000_000) {
        let declared = attrs(json!({"key_alias": "abc", "team_id": "t1", "max_budget": budget}));
        let actual = attrs(json!({"key_alias": "abc", "team_id": "t1", "max_budget": budget as f64}));
        prop_assert!(detect_drift(Key::SCHEMA, &declared, &actual).is_empty());
    }

    #[test]
    fn changed_budget_is_drift(a in 0u32..1000, b in 0u32..1000) {
        prop_assume!(a != b);
        let declared = attrs(json!({"key_alias": "abc", "team_id": "t1", "max_budget": a}));
        let actual = attrs(json!({"key_alias": "abc", "team_id": "t1", "max_budget": b}));
        prop_assert_eq!(detect_drift(Key::SCHEMA, &declared, &actual), vec!["max_budget"]);
    }

    /// Secrets never appear in redacted output
    #[test]
    fn redaction_hides_secrets(secret in "sk-[a-zA-Z0-9]{8,40}") {
        let materialized = attrs(json!({"key_alias": "abc", "team_id": "t1", "key": secret.clone()}));
        let shown = serde_json::to_string(&redact(Key::SCHEMA, &materialized)).unwrap();
        prop_assert!(!shown.contains(&secret));
    }
}
