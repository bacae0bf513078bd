use std::sync::Arc;

use tracing::debug;
use wikkid_dispatch::Registry;
use wikkid_filestore::{FileStore, FileStoreConfig};
use wikkid_store::{Revision, WorkingTree};
use wikkid_types::{Author, RevisionId};

use crate::error::SdkResult;
use crate::resource::Resource;
use crate::view::{standard_registry, DynView};

/// A resource paired with the view chosen for it.
pub struct Dispatch<T: WorkingTree> {
    pub resource: Resource<T>,
    pub view: Option<Arc<DynView>>,
}

/// High-level wiki API: a content store plus a view registry.
pub struct Wiki<T: WorkingTree> {
    store: FileStore<T>,
    registry: Registry<DynView>,
}

impl<T: WorkingTree> Wiki<T> {
    /// Open a wiki over `tree` with the standard views.
    pub fn new(tree: Arc<T>) -> SdkResult<Self> {
        Self::with_config(tree, FileStoreConfig::default())
    }

    pub fn with_config(tree: Arc<T>, config: FileStoreConfig) -> SdkResult<Self> {
        Ok(Self::with_registry(
            FileStore::with_config(tree, config),
            standard_registry()?,
        ))
    }

    /// Combine an existing store with a custom registry.
    pub fn with_registry(store: FileStore<T>, registry: Registry<DynView>) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &FileStore<T> {
        &self.store
    }

    pub fn registry(&self) -> &Registry<DynView> {
        &self.registry
    }

    /// Classify the entry at `path`. Unversioned paths are missing resources.
    pub fn resource(&self, path: &str) -> SdkResult<Resource<T>> {
        let file = self.store.entry(path)?;
        Ok(Resource::from_file(file)?)
    }

    /// The view that should render `path` under `name`, or `None` if no
    /// capability of the resource binds that name. `None` for `name` asks
    /// for the default view.
    pub fn view_for(&self, path: &str, name: Option<&str>) -> SdkResult<Option<Arc<DynView>>> {
        Ok(self.dispatch(path, name)?.view)
    }

    /// Classify `path` and pick its view in one step.
    pub fn dispatch(&self, path: &str, name: Option<&str>) -> SdkResult<Dispatch<T>> {
        let resource = self.resource(path)?;
        let view = self.registry.resolve(&resource, name);
        debug!(
            path = %resource.path(),
            kind = %resource.kind(),
            requested = name.unwrap_or("<default>"),
            found = view.is_some(),
            "dispatched view"
        );
        Ok(Dispatch { resource, view })
    }

    /// Names of every view available for `path`.
    pub fn views_for(&self, path: &str) -> SdkResult<Vec<String>> {
        let resource = self.resource(path)?;
        Ok(self
            .registry
            .view_names(resource.kind().capability())
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Write a page; see [`FileStore::update_file`].
    pub fn update_page(
        &self,
        path: &str,
        content: &[u8],
        author: &Author,
        parent_revision: Option<RevisionId>,
        message: Option<&str>,
    ) -> SdkResult<RevisionId> {
        Ok(self
            .store
            .update_file(path, content, author, parent_revision, message)?)
    }

    pub fn history(&self, limit: usize) -> SdkResult<Vec<Revision>> {
        Ok(self.store.history(limit)?)
    }
}
