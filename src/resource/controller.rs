//! Resource Lifecycle Controller
//!
//! One generic implementation of [`Lifecycle`], instantiated per entity.

use super::schema::{self, Attributes, Field};
use super::{Instance, Lifecycle, Resource, Status};
use crate::api::{ApiClient, Gateway, Key, Model};
use crate::error::{Error, Result};
use async_trait::async_trait;

/// Lifecycle controller for entity `E`
pub struct Controller<'a, E> {
    gateway: Gateway<'a, E>,
}

pub type ModelController<'a> = Controller<'a, Model>;
pub type KeyController<'a> = Controller<'a, Key>;

impl<'a, E: Resource> Controller<'a, E> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            gateway: Gateway::new(client),
        }
    }

    /// Read through the gateway and fold the result into `instance`
    async fn refresh(&self, instance: &mut Instance) -> Result<()> {
        let id = instance.id.clone().unwrap_or_default();

        match self.gateway.get(&id).await? {
            None => {
                tracing::warn!("{} {} no longer exists remotely", E::KIND, id);
                instance.mark_absent();
            }
            Some(entity) => {
                instance.attributes =
                    schema::refresh(E::SCHEMA, &instance.attributes, &entity.to_attributes());
                if instance.status != Status::Tainted {
                    instance.status = Status::Present;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<'a, E: Resource> Lifecycle for Controller<'a, E> {
    fn kind(&self) -> &'static str {
        E::KIND
    }

    fn id_field(&self) -> &'static str {
        E::ID_FIELD
    }

    fn schema(&self) -> &'static [Field] {
        E::SCHEMA
    }

    async fn create(&self, instance: &mut Instance) -> Result<()> {
        if instance.exists() {
            return Err(Error::precondition(format!(
                "{} {} already exists",
                E::KIND,
                instance.id().unwrap_or_default()
            )));
        }

        schema::validate(E::SCHEMA, &instance.attributes)?;
        let declared = E::from_attributes(&instance.attributes);
        let created = self.gateway.create(&declared).await?;

        let id = if created.id().is_empty() {
            declared.id()
        } else {
            created.id()
        };
        instance.id = Some(id.to_string());
        instance.status = Status::Present;

        // Write-only values echoed by the create (e.g. a generated secret) are
        // only ever visible here.
        let echoed = created.to_attributes();
        for field in E::SCHEMA.iter().filter(|f| f.write_only) {
            if let Some(value) = echoed.get(field.name) {
                instance
                    .attributes
                    .insert(field.name.to_string(), value.clone());
            }
        }

        if let Err(e) = self.refresh(instance).await {
            tracing::error!("{} {} created but could not be read back: {}", E::KIND, id, e);
            instance.status = Status::Tainted;
            return Err(e);
        }
        Ok(())
    }

    async fn read(&self, instance: &mut Instance) -> Result<()> {
        self.refresh(instance).await
    }

    async fn update(&self, instance: &mut Instance, declared: &Attributes) -> Result<()> {
        let Some(id) = instance.id.clone() else {
            return Err(Error::precondition(format!(
                "cannot update {} without an identifier",
                E::KIND
            )));
        };

        schema::validate(E::SCHEMA, declared)?;

        let replaced = schema::requires_replacement(E::SCHEMA, &instance.attributes, declared);
        if !replaced.is_empty() {
            return Err(Error::precondition(format!(
                "changing {} of {} {} requires replacement",
                replaced.join(", "),
                E::KIND,
                id
            )));
        }

        let mut entity = E::from_attributes(declared);
        entity.set_id(&id);
        self.gateway.update(&entity).await?;

        instance.attributes = schema::merge_declared(E::SCHEMA, &instance.attributes, declared);
        self.refresh(instance).await
    }

    async fn delete(&self, instance: &mut Instance) -> Result<()> {
        let Some(id) = instance.id.clone() else {
            instance.mark_absent();
            return Ok(());
        };

        match self.gateway.delete(&id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} {} already deleted", E::KIND, id);
            }
            Err(e) => return Err(e),
        }

        instance.mark_absent();
        Ok(())
    }
}
