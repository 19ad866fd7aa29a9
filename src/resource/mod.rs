//! Resource lifecycle layer
//!
//! This module maps declared configuration onto the entity gateways. Each
//! resource kind is described by a static schema; one generic controller
//! drives create/read/update/delete for every kind.
//!
//! # Architecture
//!
//! - [`schema`] - Field tables, validation, refresh and drift helpers
//! - [`controller`] - The per-instance state machine
//! - [`data_source`] - Read-only lookups where absence is an error
//! - `model` / `key` - Schema and attribute mapping per entity
//!
//! # Example
//!
//! ```ignore
//! use llmctl::resource::{Instance, Lifecycle, ModelController};
//!
//! async fn apply(client: &llmctl::api::ApiClient, declared: Attributes) -> llmctl::Result<()> {
//!     let controller = ModelController::new(client);
//!     let mut instance = Instance::planned(declared);
//!     controller.create(&mut instance).await?;
//!     Ok(())
//! }
//! ```

pub mod controller;
pub mod data_source;
mod key;
mod model;
pub mod schema;

use crate::api::Entity;
use crate::error::Result;
use async_trait::async_trait;

pub use controller::{Controller, KeyController, ModelController};
pub use data_source::lookup;
pub use schema::{Attributes, Field, FieldKind, Presence};

/// An entity that can be declared through a flat attribute set
pub trait Resource: Entity {
    const SCHEMA: &'static [Field];

    fn to_attributes(&self) -> Attributes;

    /// Map declared attributes onto a record. Callers validate first;
    /// missing or mistyped values map to their empty defaults.
    fn from_attributes(attrs: &Attributes) -> Self;
}

/// Where a declared instance stands relative to the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Not known to exist remotely
    #[default]
    Absent,
    /// Declared, not yet created
    Planned,
    /// Exists remotely and attributes were materialized
    Present,
    /// Created, but the follow-up read failed; the front-end should replace it
    Tainted,
}

/// In-memory state of one declared resource instance
#[derive(Debug, Clone, Default)]
pub struct Instance {
    pub status: Status,
    /// Durable identity adopted on create
    pub id: Option<String>,
    pub attributes: Attributes,
}

impl Instance {
    /// A declared instance awaiting create
    pub fn planned(declared: Attributes) -> Self {
        Self {
            status: Status::Planned,
            id: None,
            attributes: declared,
        }
    }

    /// An instance known only by identity, e.g. an import; a read materializes it
    pub fn existing(id: impl Into<String>) -> Self {
        Self {
            status: Status::Present,
            id: Some(id.into()),
            attributes: Attributes::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn exists(&self) -> bool {
        self.id.is_some() && self.status != Status::Absent
    }

    /// Release identity and forget materialized state
    pub(crate) fn mark_absent(&mut self) {
        self.status = Status::Absent;
        self.id = None;
        self.attributes.clear();
    }
}

/// Lifecycle operations the configuration front-end invokes per instance
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Resource kind, e.g. `model`
    fn kind(&self) -> &'static str;

    /// Attribute holding the instance identity, e.g. `name`
    fn id_field(&self) -> &'static str;

    fn schema(&self) -> &'static [Field];

    /// Validate the declared attributes in `instance`, create the entity and
    /// materialize it from the service.
    async fn create(&self, instance: &mut Instance) -> Result<()>;

    /// Refresh from the service. A vanished entity leaves the instance
    /// [`Status::Absent`] without an error.
    async fn read(&self, instance: &mut Instance) -> Result<()>;

    /// Apply `declared` in place at the instance's identity, then refresh.
    async fn update(&self, instance: &mut Instance, declared: &Attributes) -> Result<()>;

    /// Delete the entity and release the identity.
    async fn delete(&self, instance: &mut Instance) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_states() {
        let planned = Instance::planned(Attributes::new());
        assert_eq!(planned.status, Status::Planned);
        assert!(!planned.exists());

        let mut existing = Instance::existing("gpt-test");
        assert!(existing.exists());
        assert_eq!(existing.id(), Some("gpt-test"));

        existing.mark_absent();
        assert_eq!(existing.status, Status::Absent);
        assert!(existing.id().is_none());
        assert!(!existing.exists());
    }
}
