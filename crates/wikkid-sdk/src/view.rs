//! Built-in view descriptors.
//!
//! These carry only the dispatch key of each standard view; rendering is
//! left to whoever embeds the wiki.

use std::sync::Arc;

use wikkid_dispatch::{Capability, Registry, RegistryBuilder, ViewHandler};

use crate::error::SdkResult;
use crate::resource::{capabilities, standard_hierarchy};

/// Handler type stored in the standard registry.
pub type DynView = dyn ViewHandler + Send + Sync;

/// A built-in `(capability, name)` view binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StandardView {
    pub capability: Capability,
    pub name: &'static str,
    pub is_default: bool,
}

impl StandardView {
    const fn new(capability: Capability, name: &'static str, is_default: bool) -> Self {
        Self {
            capability,
            name,
            is_default,
        }
    }
}

impl ViewHandler for StandardView {
    fn capability(&self) -> Option<Capability> {
        Some(self.capability)
    }

    fn name(&self) -> Option<&str> {
        Some(self.name)
    }

    fn is_default(&self) -> bool {
        self.is_default
    }
}

pub const BINARY_VIEW: StandardView = StandardView::new(capabilities::BINARY_FILE, "view", true);
pub const TEXT_VIEW: StandardView = StandardView::new(capabilities::TEXT_FILE, "view", true);
pub const TEXT_RAW: StandardView = StandardView::new(capabilities::TEXT_FILE, "raw", false);
pub const PAGE_VIEW: StandardView = StandardView::new(capabilities::WIKI_PAGE, "view", true);
pub const PAGE_EDIT: StandardView = StandardView::new(capabilities::WIKI_PAGE, "edit", false);
pub const DIRECTORY_LISTING: StandardView =
    StandardView::new(capabilities::DIRECTORY, "listing", true);
pub const MISSING_VIEW: StandardView = StandardView::new(capabilities::MISSING, "missing", true);

pub const STANDARD_VIEWS: &[StandardView] = &[
    BINARY_VIEW,
    TEXT_VIEW,
    TEXT_RAW,
    PAGE_VIEW,
    PAGE_EDIT,
    DIRECTORY_LISTING,
    MISSING_VIEW,
];

/// A builder over the standard hierarchy with every standard view bound.
///
/// Embedders add their own handlers before calling `build`.
pub fn standard_registry_builder() -> SdkResult<RegistryBuilder<DynView>> {
    let mut builder = RegistryBuilder::<DynView>::new(standard_hierarchy()?);
    for view in STANDARD_VIEWS {
        builder.try_register(Arc::new(*view))?;
    }
    Ok(builder)
}

pub fn standard_registry() -> SdkResult<Registry<DynView>> {
    Ok(standard_registry_builder()?.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use capabilities::*;

    fn name_of(registry: &Registry<DynView>, cap: Capability, name: Option<&str>) -> Option<String> {
        registry
            .resolve_capability(cap, name)
            .and_then(|v| v.name().map(str::to_string))
    }

    #[test]
    fn defaults_per_resource() {
        let r = standard_registry().unwrap();
        assert_eq!(name_of(&r, BINARY_FILE, None).as_deref(), Some("view"));
        assert_eq!(name_of(&r, TEXT_FILE, None).as_deref(), Some("view"));
        assert_eq!(name_of(&r, WIKI_PAGE, None).as_deref(), Some("view"));
        assert_eq!(name_of(&r, DIRECTORY, None).as_deref(), Some("listing"));
        assert_eq!(name_of(&r, MISSING, None).as_deref(), Some("missing"));
    }

    #[test]
    fn wiki_pages_inherit_raw_from_text_files() {
        let r = standard_registry().unwrap();
        let raw = r.resolve_capability(WIKI_PAGE, Some("raw")).unwrap();
        assert_eq!(raw.capability(), Some(TEXT_FILE));
        assert!(r.resolve_capability(TEXT_FILE, Some("edit")).is_none());
    }

    #[test]
    fn raw_is_not_offered_for_binaries_or_directories() {
        let r = standard_registry().unwrap();
        assert!(r.resolve_capability(BINARY_FILE, Some("raw")).is_none());
        assert!(r.resolve_capability(DIRECTORY, Some("raw")).is_none());
    }

    #[test]
    fn builder_accepts_extra_views() {
        let mut builder = standard_registry_builder().unwrap();
        builder.register(Arc::new(StandardView::new(RESOURCE, "history", false)));
        let r = builder.build();
        assert_eq!(name_of(&r, BINARY_FILE, Some("history")).as_deref(), Some("history"));
        assert_eq!(name_of(&r, MISSING, Some("history")).as_deref(), Some("history"));
    }

    #[test]
    #[should_panic(expected = "key already registered")]
    fn rebinding_a_standard_key_is_fatal() {
        let mut builder = standard_registry_builder().unwrap();
        builder.register(Arc::new(StandardView::new(WIKI_PAGE, "edit", false)));
    }
}
