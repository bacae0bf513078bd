use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const DIGEST_LEN: usize = 32;
const SHORT_LEN: usize = 4;

/// BLAKE3 digest naming one stored object (page content, manifest or
/// revision record). Written out as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId([u8; DIGEST_LEN]);

impl ObjectId {
    /// Plain BLAKE3 of `data`. Stores hash with a keyed context instead, so
    /// this is mainly useful for fixtures.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    pub fn from_hash(digest: [u8; DIGEST_LEN]) -> Self {
        Self(digest)
    }

    /// All-zero id. No store ever hands this out.
    pub const fn null() -> Self {
        Self([0; DIGEST_LEN])
    }

    pub fn is_null(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight hex characters.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..SHORT_LEN])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let mut digest = [0; DIGEST_LEN];
        hex::decode_to_slice(s, &mut digest).map_err(|e| TypeError::InvalidId {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(digest))
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.short_hex()).finish()
    }
}

impl TryFrom<String> for ObjectId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_hex()
    }
}

/// A committed revision, named by the object id of its revision record.
/// Equal histories therefore produce equal revision ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(ObjectId);

impl RevisionId {
    const PREFIX: &'static str = "r:";

    pub fn new(id: ObjectId) -> Self {
        Self(id)
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.0
    }

    /// `r:` followed by the short hex, as printed by logs and the CLI.
    pub fn short_id(&self) -> String {
        format!("{}{}", Self::PREFIX, self.0.short_hex())
    }

    /// Accepts the bare hex or the `r:`-prefixed form.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        s.strip_prefix(Self::PREFIX).unwrap_or(s).parse().map(Self)
    }
}

impl FromStr for RevisionId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RevisionId").field(&self.short_id()).finish()
    }
}
