use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    ops::Deref,
};

use mongodb::Database;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Resource: {0}")]
    Resource(String),
}

#[derive(Default)]
pub struct Resource(HashMap<TypeId, Box<dyn Any + Sync + Send>>);

impl Deref for Resource {
    type Target = HashMap<TypeId, Box<dyn Any + Sync + Send>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Resource {
    pub fn insert<R: Any + Send + Sync>(&mut self, resource: R) {
        self.0.insert(TypeId::of::<R>(), Box::new(resource));
    }
}

impl Debug for Resource {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Resource").finish()
    }
}

/// Shared state handed to every migration step.
#[derive(Debug, Default)]
pub struct Context {
    resources: Resource,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// The database migrations run against.
    pub fn database(&self) -> Result<&Database, ContextError> {
        self.resource::<Database>()
    }

    pub fn resource<R: Any + Send + Sync>(&self) -> Result<&R, ContextError> {
        self.resource_opt::<R>().ok_or_else(|| {
            ContextError::Resource(format!(
                "Resource `{}` does not exist.",
                std::any::type_name::<R>()
            ))
        })
    }

    pub fn resource_opt<R: Any + Send + Sync>(&self) -> Option<&R> {
        self.resources
            .0
            .get(&TypeId::of::<R>())
            .and_then(|d| d.downcast_ref::<R>())
    }

    pub fn insert_resource<R: Any + Send + Sync>(&mut self, resource: R) {
        self.resources.insert(resource)
    }
}
