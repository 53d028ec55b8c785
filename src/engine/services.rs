//! engine::services
//!
//! Service resolution for parameters that are not read from the command line.
//!
//! # Architecture
//!
//! The binder only sees the [`ServiceResolver`] trait. Hosts with their own
//! container implement it directly; [`ServiceCollection`] is the in-memory
//! implementation used by [`crate::app::AppBuilder`].
//!
//! Services are keyed by `TypeId`. To expose a trait object, register the
//! `Arc<dyn Trait>` itself as the service type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Identity of a service type.
#[derive(Clone, Copy)]
pub struct ServiceKey {
    id: TypeId,
    type_name: &'static str,
}

impl ServiceKey {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl std::hash::Hash for ServiceKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceKey({})", self.type_name)
    }
}

/// A resolved service instance.
pub type ServiceRef = Arc<dyn Any + Send + Sync>;

/// Errors from resolving a service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no service registered for '{type_name}'")]
    NotRegistered { type_name: &'static str },

    #[error("failed to create '{type_name}'")]
    Construction {
        type_name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Resolves service parameters by type.
#[async_trait]
pub trait ServiceResolver: Send + Sync {
    async fn resolve(&self, key: ServiceKey) -> Result<ServiceRef, ServiceError>;
}

type Factory = Arc<dyn Fn() -> anyhow::Result<ServiceRef> + Send + Sync>;

#[derive(Clone)]
enum Registration {
    Instance(ServiceRef),
    Factory(Factory),
}

/// In-memory service registry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use trellis::engine::services::{ServiceCollection, ServiceKey, ServiceResolver};
///
/// trait Greeter: Send + Sync {
///     fn name(&self) -> String;
/// }
/// struct Alice;
/// impl Greeter for Alice {
///     fn name(&self) -> String { "Alice".into() }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_instance::<Arc<dyn Greeter>>(Arc::new(Alice));
///
/// let resolved = tokio_test::block_on(services.resolve(ServiceKey::of::<Arc<dyn Greeter>>())).unwrap();
/// let greeter = resolved.downcast::<Arc<dyn Greeter>>().unwrap();
/// assert_eq!(greeter.name(), "Alice");
/// ```
#[derive(Clone, Default)]
pub struct ServiceCollection {
    registrations: HashMap<ServiceKey, Registration>,
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.registrations.keys().map(ServiceKey::type_name))
            .finish()
    }
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singleton instance.
    pub fn add_instance<T: Any + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.registrations
            .insert(ServiceKey::of::<T>(), Registration::Instance(Arc::new(value)));
        self
    }

    /// Register a factory run on every resolution.
    pub fn add_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let factory: Factory =
            Arc::new(move || factory().map(|value| Arc::new(value) as ServiceRef));
        self.registrations
            .insert(ServiceKey::of::<T>(), Registration::Factory(factory));
        self
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.registrations.contains_key(&ServiceKey::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

#[async_trait]
impl ServiceResolver for ServiceCollection {
    async fn resolve(&self, key: ServiceKey) -> Result<ServiceRef, ServiceError> {
        match self.registrations.get(&key) {
            Some(Registration::Instance(value)) => Ok(Arc::clone(value)),
            Some(Registration::Factory(factory)) => {
                factory().map_err(|source| ServiceError::Construction {
                    type_name: key.type_name(),
                    source,
                })
            }
            None => Err(ServiceError::NotRegistered {
                type_name: key.type_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn instance_is_shared() {
        let mut services = ServiceCollection::new();
        services.add_instance(String::from("Alice"));

        let a = services.resolve(ServiceKey::of::<String>()).await.unwrap();
        let b = services.resolve(ServiceKey::of::<String>()).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.downcast::<String>().unwrap().as_str(), "Alice");
    }

    #[tokio::test]
    async fn factory_errors_become_construction_failures() {
        let mut services = ServiceCollection::new();
        services.add_factory::<u32, _>(|| anyhow::bail!("database offline"));

        let err = services.resolve(ServiceKey::of::<u32>()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Construction { .. }));
    }

    #[test]
    fn missing_service_names_the_type() {
        let services = ServiceCollection::new();
        let err = tokio_test::block_on(services.resolve(ServiceKey::of::<i64>())).unwrap_err();
        assert_eq!(err.to_string(), "no service registered for 'i64'");
    }
}
