//! Capability tags and the hierarchy they form.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::HierarchyError;

/// An abstract behavioural tag an object advertises, used as a dispatch key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability(&'static str);

impl Capability {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({})", self.0)
    }
}

/// Something that advertises a capability and can therefore be dispatched on.
pub trait Advertises {
    fn capability(&self) -> Capability;
}

impl Advertises for Capability {
    fn capability(&self) -> Capability {
        *self
    }
}

/// A statically declared DAG of capabilities.
///
/// Each tag's *lineage* is the tag itself followed by all of its ancestors,
/// most specific first. A tag always precedes its ancestors; ties between
/// unrelated ancestors go to the one reached first through the parents in
/// the order they were declared. Lineages are computed once, at build time.
#[derive(Clone, Debug, Default)]
pub struct CapabilityHierarchy {
    lineages: HashMap<Capability, Vec<Capability>>,
    declared: Vec<Capability>,
}

impl CapabilityHierarchy {
    pub fn builder() -> HierarchyBuilder {
        HierarchyBuilder::default()
    }

    /// Lineage of `tag`, or `None` if it was never declared.
    pub fn lineage(&self, tag: Capability) -> Option<&[Capability]> {
        self.lineages.get(&tag).map(Vec::as_slice)
    }

    pub fn contains(&self, tag: Capability) -> bool {
        self.lineages.contains_key(&tag)
    }

    /// Returns `true` if `tag` is `ancestor` or descends from it.
    pub fn is_a(&self, tag: Capability, ancestor: Capability) -> bool {
        self.lineage(tag)
            .is_some_and(|lineage| lineage.contains(&ancestor))
    }

    /// Every declared tag, in declaration order.
    pub fn tags(&self) -> &[Capability] {
        &self.declared
    }
}

/// Builder for [`CapabilityHierarchy`].
///
/// Parents must be declared before their children, which rules out cycles.
///
/// ```
/// use wikkid_dispatch::{Capability, CapabilityHierarchy};
///
/// const FILE: Capability = Capability::new("file");
/// const TEXT: Capability = Capability::new("text-file");
///
/// let hierarchy = CapabilityHierarchy::builder()
///     .declare(FILE, &[])?
///     .declare(TEXT, &[FILE])?
///     .build();
/// assert_eq!(hierarchy.lineage(TEXT), Some(&[TEXT, FILE][..]));
/// # Ok::<(), wikkid_dispatch::HierarchyError>(())
/// ```
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    parents: ParentMap,
    declared: Vec<Capability>,
}

impl HierarchyBuilder {
    /// Declare `tag` with its direct parents, most relevant first.
    pub fn declare(mut self, tag: Capability, parents: &[Capability]) -> Result<Self, HierarchyError> {
        if self.parents.contains_key(&tag) {
            return Err(HierarchyError::DuplicateTag(tag));
        }
        if let Some(parent) = parents.iter().find(|p| !self.parents.contains_key(*p)) {
            return Err(HierarchyError::UnknownParent {
                tag,
                parent: *parent,
            });
        }
        let mut unique = Vec::with_capacity(parents.len());
        for parent in parents {
            if !unique.contains(parent) {
                unique.push(*parent);
            }
        }
        self.parents.insert(tag, unique);
        self.declared.push(tag);
        Ok(self)
    }

    pub fn build(self) -> CapabilityHierarchy {
        let lineages = self
            .declared
            .iter()
            .map(|tag| (*tag, linearize(&self.parents, *tag)))
            .collect();
        CapabilityHierarchy {
            lineages,
            declared: self.declared,
        }
    }
}

type ParentMap = HashMap<Capability, Vec<Capability>>;

fn parents_of<'a>(parents: &'a ParentMap, tag: &Capability) -> &'a [Capability] {
    parents.get(tag).map(Vec::as_slice).unwrap_or(&[])
}

/// Topologically order `tag` and its ancestors, children before parents.
fn linearize(parents: &ParentMap, tag: Capability) -> Vec<Capability> {
    // Breadth-first discovery fixes the tie-breaking priority.
    let mut discovered = vec![tag];
    let mut seen = HashSet::from([tag]);
    let mut i = 0;
    while i < discovered.len() {
        for parent in parents_of(parents, &discovered[i]) {
            if seen.insert(*parent) {
                discovered.push(*parent);
            }
        }
        i += 1;
    }

    // Number of not-yet-emitted children of each node within the subgraph.
    let mut pending: HashMap<Capability, usize> = HashMap::new();
    for node in &discovered {
        for parent in parents_of(parents, node) {
            *pending.entry(*parent).or_default() += 1;
        }
    }

    let mut lineage = Vec::with_capacity(discovered.len());
    let mut emitted = HashSet::new();
    while lineage.len() < discovered.len() {
        let Some(next) = discovered
            .iter()
            .copied()
            .find(|c| !emitted.contains(c) && pending.get(c).copied().unwrap_or(0) == 0)
        else {
            break;
        };
        emitted.insert(next);
        lineage.push(next);
        for parent in parents_of(parents, &next) {
            if let Some(count) = pending.get_mut(parent) {
                *count -= 1;
            }
        }
    }
    lineage
}
