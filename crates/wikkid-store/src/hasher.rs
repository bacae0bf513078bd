use wikkid_types::ObjectId;

use crate::object::ObjectKind;

/// BLAKE3 in key-derivation mode, one context string per object kind.
///
/// A page whose bytes happen to equal a serialized manifest still gets a
/// different id, because the two are hashed under different contexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    context: &'static str,
}

impl ContentHasher {
    pub const BLOB: Self = Self::new("wikkid 2010 blob v1");
    pub const MANIFEST: Self = Self::new("wikkid 2010 manifest v1");
    pub const REVISION: Self = Self::new("wikkid 2010 revision v1");

    const fn new(context: &'static str) -> Self {
        Self { context }
    }

    /// The hasher objects of `kind` are addressed with.
    pub fn for_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Blob => Self::BLOB,
            ObjectKind::Manifest => Self::MANIFEST,
            ObjectKind::Revision => Self::REVISION,
        }
    }

    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new_derive_key(self.context);
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Whether `data` hashes to `expected` under this context.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    pub fn context(&self) -> &'static str {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_for_equal_input() {
        let page = b"FrontPage text";
        assert_eq!(ContentHasher::BLOB.hash(page), ContentHasher::BLOB.hash(page));
    }

    #[test]
    fn kinds_never_collide() {
        let bytes = b"{\"entries\":[]}";
        let ids: Vec<_> = [ObjectKind::Blob, ObjectKind::Manifest, ObjectKind::Revision]
            .into_iter()
            .map(|k| ContentHasher::for_kind(k).hash(bytes))
            .collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[0], ids[2]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn verify_rejects_edited_content() {
        let id = ContentHasher::BLOB.hash(b"v1");
        assert!(ContentHasher::BLOB.verify(b"v1", &id));
        assert!(!ContentHasher::BLOB.verify(b"v2", &id));
        assert!(!ContentHasher::MANIFEST.verify(b"v1", &id));
    }

    #[test]
    fn not_a_plain_hash() {
        assert_ne!(ContentHasher::BLOB.hash(b"x"), ObjectId::from_bytes(b"x"));
    }
}
