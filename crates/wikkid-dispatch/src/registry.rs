use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::capability::{Advertises, Capability, CapabilityHierarchy};
use crate::error::RegistrationError;

/// Name half of a registry key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewName {
    Named(String),
    /// The view used when the caller names none.
    Default,
}

impl ViewName {
    /// `None` maps to [`ViewName::Default`].
    pub fn from_option(name: Option<&str>) -> Self {
        match name {
            Some(n) => Self::Named(n.to_string()),
            None => Self::Default,
        }
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            Self::Named(n) => Some(n),
            Self::Default => None,
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => f.write_str(n),
            Self::Default => f.write_str("<default>"),
        }
    }
}

/// A unit of rendering logic bound to a `(capability, name)` pair.
///
/// Handlers that leave either half unset are skipped at registration.
pub trait ViewHandler {
    fn capability(&self) -> Option<Capability>;

    fn name(&self) -> Option<&str>;

    /// Whether this handler also answers requests that name no view.
    fn is_default(&self) -> bool {
        false
    }
}

type Key = (Capability, ViewName);

/// Collects handlers during initialization, then freezes into a [`Registry`].
pub struct RegistryBuilder<H: ?Sized> {
    hierarchy: CapabilityHierarchy,
    entries: HashMap<Key, Arc<H>>,
}

impl<H: ViewHandler + ?Sized> RegistryBuilder<H> {
    pub fn new(hierarchy: CapabilityHierarchy) -> Self {
        Self {
            hierarchy,
            entries: HashMap::new(),
        }
    }

    /// Register a handler, reporting key collisions instead of panicking.
    ///
    /// A default handler claims both its named key and the default key of
    /// its capability; if either is taken, neither is inserted.
    pub fn try_register(&mut self, handler: Arc<H>) -> Result<&mut Self, RegistrationError> {
        let (Some(capability), Some(name)) = (handler.capability(), handler.name()) else {
            debug!("skipping handler without capability or name");
            return Ok(self);
        };
        if !self.hierarchy.contains(capability) {
            return Err(RegistrationError::UnknownCapability(capability));
        }

        let mut keys = vec![(capability, ViewName::Named(name.to_string()))];
        if handler.is_default() {
            keys.push((capability, ViewName::Default));
        }
        if let Some((capability, name)) = keys.iter().find(|k| self.entries.contains_key(*k)) {
            return Err(RegistrationError::Duplicate {
                capability: *capability,
                name: name.clone(),
            });
        }

        debug!(
            capability = %capability,
            view = name,
            default = handler.is_default(),
            "registered view"
        );
        for key in keys {
            self.entries.insert(key, Arc::clone(&handler));
        }
        Ok(self)
    }

    /// Register a handler.
    ///
    /// # Panics
    ///
    /// On a key collision or an undeclared capability. Registration is part
    /// of start-up, and a registry with two claimants for one key has no
    /// correct answer.
    pub fn register(&mut self, handler: Arc<H>) -> &mut Self {
        if let Err(e) = self.try_register(handler) {
            panic!("{e}");
        }
        self
    }

    pub fn build(self) -> Registry<H> {
        Registry {
            hierarchy: self.hierarchy,
            entries: self.entries,
        }
    }
}

/// Immutable `(capability, view name) -> handler` table.
///
/// ```
/// use std::sync::Arc;
/// use wikkid_dispatch::{Capability, CapabilityHierarchy, RegistryBuilder, ViewHandler};
///
/// const FILE: Capability = Capability::new("file");
/// const TEXT: Capability = Capability::new("text-file");
///
/// struct Raw;
/// impl ViewHandler for Raw {
///     fn capability(&self) -> Option<Capability> { Some(FILE) }
///     fn name(&self) -> Option<&str> { Some("raw") }
///     fn is_default(&self) -> bool { true }
/// }
///
/// let hierarchy = CapabilityHierarchy::builder()
///     .declare(FILE, &[])?
///     .declare(TEXT, &[FILE])?
///     .build();
/// let mut builder = RegistryBuilder::<dyn ViewHandler>::new(hierarchy);
/// builder.register(Arc::new(Raw));
/// let registry = builder.build();
///
/// assert!(registry.resolve(&TEXT, Some("raw")).is_some());
/// assert!(registry.resolve(&TEXT, None).is_some());
/// assert!(registry.resolve(&TEXT, Some("edit")).is_none());
/// # Ok::<(), wikkid_dispatch::HierarchyError>(())
/// ```
pub struct Registry<H: ?Sized> {
    hierarchy: CapabilityHierarchy,
    entries: HashMap<Key, Arc<H>>,
}

impl<H: ?Sized> Registry<H> {
    /// The handler for the most specific capability of `object` that has a
    /// binding for `name`. `None` asks for the default view.
    pub fn resolve<O: Advertises + ?Sized>(&self, object: &O, name: Option<&str>) -> Option<Arc<H>> {
        self.resolve_capability(object.capability(), name)
    }

    pub fn resolve_capability(&self, capability: Capability, name: Option<&str>) -> Option<Arc<H>> {
        let Some(lineage) = self.hierarchy.lineage(capability) else {
            debug!(capability = %capability, "capability not in hierarchy");
            return None;
        };
        let name = ViewName::from_option(name);
        lineage.iter().find_map(|cap| {
            self.entries
                .get(&(*cap, name.clone()))
                .map(Arc::clone)
        })
    }

    /// Every named view reachable from `capability`, sorted.
    pub fn view_names(&self, capability: Capability) -> Vec<&str> {
        let lineage = self.hierarchy.lineage(capability).unwrap_or(&[]);
        let mut names: Vec<&str> = self
            .entries
            .keys()
            .filter(|(cap, _)| lineage.contains(cap))
            .filter_map(|(_, name)| name.as_named())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn hierarchy(&self) -> &CapabilityHierarchy {
        &self.hierarchy
    }

    /// Number of bound keys, default bindings included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: ?Sized> fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("Registry")
            .field("hierarchy", &self.hierarchy.tags())
            .field("keys", &keys)
            .finish()
    }
}
