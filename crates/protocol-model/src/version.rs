//! Schema version identifiers
//!
//! Documents declare their shape with a `schemaVersion` field holding either
//! an integer or the pre-versioning string sentinel `"1.0.0"`. Both forms are
//! modelled explicitly by [`VersionId`] rather than compared loosely.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Newest schema version this toolkit produces and validates.
///
/// The step and validator registries (versions 1 through this value) are the
/// single source of truth for which versions exist.
pub const CURRENT_VERSION: u32 = 8;

/// Oldest schema version with a registered shape.
pub const OLDEST_VERSION: u32 = 1;

/// Wire form of the legacy pre-versioning sentinel.
pub const LEGACY_SENTINEL: &str = "1.0.0";

/// Schema version as declared by a protocol document.
///
/// Legacy documents share version 1's shape; [`VersionId::rank`] maps both
/// onto the same position in the migration order. Note that `Legacy` and
/// `Numbered(1)` are distinct values with equal rank - migration logic always
/// compares ranks, never `VersionId` values directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionId {
    /// Pre-versioning documents tagged with the literal string `"1.0.0"`.
    Legacy,
    /// Integer schema versions.
    Numbered(u32),
}

impl VersionId {
    /// Position of this version in the migration order.
    #[inline]
    #[must_use]
    pub fn rank(&self) -> u32 {
        match self {
            Self::Legacy => 1,
            Self::Numbered(n) => *n,
        }
    }

    /// Whether this version is inside the supported range.
    #[inline]
    #[must_use]
    pub fn is_known(&self) -> bool {
        (OLDEST_VERSION..=CURRENT_VERSION).contains(&self.rank())
    }

    /// Read the declared `schemaVersion` of a document.
    ///
    /// # Errors
    /// - [`VersionError::Missing`] if the field is absent
    /// - [`VersionError::Malformed`] if the field is neither an integer nor
    ///   the `"1.0.0"` sentinel
    pub fn from_document(document: &Value) -> Result<Self, VersionError> {
        let declared = document
            .get("schemaVersion")
            .ok_or(VersionError::Missing)?;
        Self::from_value(declared)
    }

    /// Classify a raw `schemaVersion` value.
    ///
    /// Unknown-but-well-formed versions (e.g. `99`) parse successfully;
    /// rejecting them is the path resolver's job, not the parser's.
    ///
    /// # Errors
    /// Returns [`VersionError::Malformed`] for anything that is not a
    /// non-negative integer or the `"1.0.0"` sentinel.
    pub fn from_value(value: &Value) -> Result<Self, VersionError> {
        match value {
            Value::String(s) if s == LEGACY_SENTINEL => Ok(Self::Legacy),
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Self::Numbered)
                .ok_or_else(|| VersionError::Malformed {
                    found: value.to_string(),
                }),
            other => Err(VersionError::Malformed {
                found: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str(LEGACY_SENTINEL),
            Self::Numbered(n) => write!(f, "{n}"),
        }
    }
}

impl From<u32> for VersionId {
    fn from(version: u32) -> Self {
        Self::Numbered(version)
    }
}

impl Serialize for VersionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Legacy => serializer.serialize_str(LEGACY_SENTINEL),
            Self::Numbered(n) => serializer.serialize_u32(*n),
        }
    }
}

impl<'de> Deserialize<'de> for VersionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionVisitor;

        impl Visitor<'_> for VersionVisitor {
            type Value = VersionId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer schema version or the string \"1.0.0\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<VersionId, E> {
                u32::try_from(v)
                    .map(VersionId::Numbered)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<VersionId, E> {
                u32::try_from(v)
                    .map(VersionId::Numbered)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<VersionId, E> {
                if v == LEGACY_SENTINEL {
                    Ok(VersionId::Legacy)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(VersionVisitor)
    }
}

/// Errors reading a document's declared version
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The document has no `schemaVersion` field
    #[error("document does not declare a schemaVersion")]
    Missing,

    /// The field is neither an integer nor the legacy sentinel
    #[error("schemaVersion {found} is not an integer or the \"1.0.0\" sentinel")]
    Malformed {
        /// JSON rendering of the offending value
        found: String,
    },
}
