//! Core types shared by every part of the registry
//!
//! - [`error`] - [`RegistryError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`component`] - [`ComponentKind`] tiers and [`ComponentKey`] registry paths
//! - [`Instance`] - the opaque handle every built component is stored as
//!
//! Built components are never inspected by the core. They are stored as
//! reference-counted `Any` values so identity is observable through
//! [`same_instance`] and consumers can downcast to the concrete adapter type.

pub mod component;
pub mod error;

pub use component::{ComponentKey, ComponentKind};
pub use error::{ErrorContext, RegistryError, user_friendly_error};

use std::any::Any;
use std::sync::Arc;

/// A built component instance.
///
/// Cloning an `Instance` clones the handle, never the component.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wrap a value into an [`Instance`].
pub fn instance<T: Any + Send + Sync>(value: T) -> Instance {
    Arc::new(value)
}

/// Reference equality between two instances.
#[must_use]
pub fn same_instance(a: &Instance, b: &Instance) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
