//! Capability-based view dispatch for the Wikkid wiki.
//!
//! Objects advertise a [`Capability`]; capabilities form a
//! [`CapabilityHierarchy`]. Handlers are bound to `(capability, view name)`
//! keys through a [`RegistryBuilder`] during start-up, after which the
//! frozen [`Registry`] answers "which handler renders this object under
//! this name?" by walking the object's lineage from the most specific
//! capability outwards.
//!
//! The registry is an ordinary value passed by reference; there is no
//! process-wide table.

pub mod capability;
pub mod error;
pub mod registry;

pub use capability::{Advertises, Capability, CapabilityHierarchy, HierarchyBuilder};
pub use error::{HierarchyError, RegistrationError};
pub use registry::{Registry, RegistryBuilder, ViewHandler, ViewName};
