use crate::capability::Capability;
use crate::registry::ViewName;

/// Errors raised while declaring a capability hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// A parent was referenced before it was declared.
    #[error("capability {tag} names undeclared parent {parent}")]
    UnknownParent { tag: Capability, parent: Capability },

    /// The same tag was declared twice.
    #[error("capability {0} declared twice")]
    DuplicateTag(Capability),
}

/// Errors raised while populating a registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Another handler already claims this key.
    #[error("key already registered: ({capability}, {name})")]
    Duplicate {
        capability: Capability,
        name: ViewName,
    },

    /// The handler's capability is not part of the registry's hierarchy.
    #[error("capability {0} is not declared in the hierarchy")]
    UnknownCapability(Capability),
}
