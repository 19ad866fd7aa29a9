//! Manifest reconciler
//!
//! A small declarative front-end over the lifecycle controllers. A manifest
//! lists models and keys as flat attribute sets; models are reconciled first
//! so keys can reference them. Within a kind, distinct identities are
//! reconciled concurrently.

use crate::api::ApiClient;
use crate::resource::schema::{detect_drift, redact};
use crate::resource::{
    Attributes, Field, Instance, KeyController, Lifecycle, ModelController, Presence,
};
use anyhow::{Context, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Desired state for a set of models and keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub models: Vec<Attributes>,
    #[serde(default)]
    pub keys: Vec<Attributes>,
}

impl Manifest {
    /// Parse a YAML (or JSON) manifest
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse manifest")
    }

    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {:?}", path))?;
        Self::parse(&content)
    }
}

/// What reconciliation did for one declared instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Updated,
    Unchanged,
    Failed,
}

/// Result for one declared instance
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub kind: &'static str,
    pub id: String,
    pub action: Action,
    /// Materialized attributes, sensitive values masked
    pub attributes: Attributes,
    /// Values the service generated on create. Reads never return them, so
    /// this is the only chance to see them.
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub secrets: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    fn failed(kind: &'static str, id: &str, error: impl ToString) -> Self {
        Self {
            kind,
            id: id.to_string(),
            action: Action::Failed,
            attributes: Attributes::new(),
            secrets: Attributes::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.action == Action::Failed
    }
}

/// Fields an update would send for an existing instance: drifted fields plus
/// every declared write-only field, since reads cannot confirm those.
fn fields_to_apply(
    schema: &[Field],
    declared: &Attributes,
    actual: &Attributes,
) -> Vec<&'static str> {
    let mut fields = detect_drift(schema, declared, actual);
    fields.extend(
        schema
            .iter()
            .filter(|f| f.write_only && declared.get(f.name).is_some_and(|v| !v.is_null()))
            .map(|f| f.name),
    );
    fields
}

/// Computed write-only values present after a create, e.g. a key secret
fn generated_secrets(schema: &[Field], attrs: &Attributes) -> Attributes {
    schema
        .iter()
        .filter(|f| f.presence == Presence::Computed && f.write_only)
        .filter_map(|f| attrs.get(f.name).map(|v| (f.name.to_string(), v.clone())))
        .collect()
}

/// Reconcile every declared model, then every declared key
pub async fn reconcile(client: &ApiClient, manifest: &Manifest) -> Vec<Outcome> {
    let mut outcomes = reconcile_kind(&ModelController::new(client), &manifest.models).await;

    if outcomes.iter().any(Outcome::is_failure) {
        tracing::warn!("Some models failed to reconcile; keys referencing them may fail too");
    }

    outcomes.extend(reconcile_kind(&KeyController::new(client), &manifest.keys).await);
    outcomes
}

/// Reconcile all declarations of one kind concurrently
pub async fn reconcile_kind(controller: &dyn Lifecycle, declared: &[Attributes]) -> Vec<Outcome> {
    let mut seen = HashSet::new();
    let mut duplicates = HashSet::new();
    for attrs in declared {
        let id = identity(controller, attrs);
        if !seen.insert(id.clone()) {
            duplicates.insert(id);
        }
    }

    let futures = declared.iter().map(|attrs| {
        let duplicates = &duplicates;
        async move {
            let id = identity(controller, attrs);
            if duplicates.contains(&id) {
                return Outcome::failed(
                    controller.kind(),
                    &id,
                    format!("{} '{}' is declared more than once", controller.kind(), id),
                );
            }
            reconcile_one(controller, attrs).await
        }
    });

    join_all(futures).await
}

fn identity(controller: &dyn Lifecycle, attrs: &Attributes) -> String {
    attrs
        .get(controller.id_field())
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Read by declared identity, then create, update or leave alone
pub async fn reconcile_one(controller: &dyn Lifecycle, declared: &Attributes) -> Outcome {
    let kind = controller.kind();
    let id = identity(controller, declared);
    let schema = controller.schema();

    let mut instance = if id.is_empty() {
        Instance::default()
    } else {
        let mut instance = Instance::existing(id.as_str());
        if let Err(e) = controller.read(&mut instance).await {
            return Outcome::failed(kind, &id, e);
        }
        instance
    };

    let mut secrets = Attributes::new();
    let action = if !instance.exists() {
        instance = Instance::planned(declared.clone());
        if let Err(e) = controller.create(&mut instance).await {
            return Outcome::failed(kind, &id, e);
        }
        secrets = generated_secrets(schema, &instance.attributes);
        Action::Created
    } else {
        let fields = fields_to_apply(schema, declared, &instance.attributes);
        if fields.is_empty() {
            tracing::debug!("{} {} is up to date", kind, id);
            Action::Unchanged
        } else {
            tracing::info!("{} {} needs update of {:?}", kind, id, fields);
            if let Err(e) = controller.update(&mut instance, declared).await {
                return Outcome::failed(kind, &id, e);
            }
            Action::Updated
        }
    };

    Outcome {
        kind,
        id: instance.id().unwrap_or(&id).to_string(),
        action,
        attributes: redact(schema, &instance.attributes),
        secrets,
        error: None,
    }
}

/// Planned change for one declared instance, computed without writing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "change")]
pub enum Change {
    Create,
    Update {
        /// Fields whose remote value differs from the declaration, plus
        /// declared write-only fields
        fields: Vec<&'static str>,
    },
    NoOp,
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub kind: &'static str,
    pub id: String,
    #[serde(flatten)]
    pub change: Change,
}

/// Compare every declaration with the control plane without modifying it
pub async fn plan(client: &ApiClient, manifest: &Manifest) -> Vec<PlanEntry> {
    let models = ModelController::new(client);
    let keys = KeyController::new(client);

    let mut planned = plan_kind(&models, &manifest.models).await;
    planned.extend(plan_kind(&keys, &manifest.keys).await);
    planned
}

async fn plan_kind(controller: &dyn Lifecycle, declared: &[Attributes]) -> Vec<PlanEntry> {
    let futures = declared.iter().map(|attrs| async move {
        let id = identity(controller, attrs);
        let change = plan_one(controller, &id, attrs).await;
        PlanEntry {
            kind: controller.kind(),
            id,
            change,
        }
    });
    join_all(futures).await
}

async fn plan_one(controller: &dyn Lifecycle, id: &str, declared: &Attributes) -> Change {
    if id.is_empty() {
        return Change::Create;
    }
    let mut instance = Instance::existing(id);
    if let Err(e) = controller.read(&mut instance).await {
        return Change::Error {
            message: e.to_string(),
        };
    }
    if !instance.exists() {
        return Change::Create;
    }
    let fields = fields_to_apply(controller.schema(), declared, &instance.attributes);
    if fields.is_empty() {
        Change::NoOp
    } else {
        Change::Update { fields }
    }
}
