//! # UUID Recognition
//!
//! Format checks behind the `uuid/v1` and `uuid/v4` type keywords. Both are
//! pure layout checks on the textual form; no other UUID encodings (braced,
//! URN, simple hex) are accepted.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static UUID_V1_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("static uuid/v1 pattern compiles")
});

static UUID_V4_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("static uuid/v4 pattern compiles")
});

/// The UUID layouts a schema can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UuidVersion {
    /// `uuid/v1`: any 8-4-4-4-12 hex layout.
    #[serde(rename = "uuid/v1")]
    V1,
    /// `uuid/v4`: RFC 4122 version 4 with the variant nibble in `[89ab]`.
    #[serde(rename = "uuid/v4")]
    V4,
}

impl UuidVersion {
    /// Resolve a type keyword such as `"uuid/v4"`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "uuid/v1" => Some(UuidVersion::V1),
            "uuid/v4" => Some(UuidVersion::V4),
            _ => None,
        }
    }

    /// The keyword this version is declared with.
    pub fn keyword(&self) -> &'static str {
        match self {
            UuidVersion::V1 => "uuid/v1",
            UuidVersion::V4 => "uuid/v4",
        }
    }

    /// Returns true if `candidate` has this version's layout.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            UuidVersion::V1 => is_uuid_v1(candidate),
            UuidVersion::V4 => is_uuid_v4(candidate),
        }
    }
}

impl fmt::Display for UuidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Returns true for an 8-4-4-4-12 hex string, case-insensitive.
pub fn is_uuid_v1(candidate: &str) -> bool {
    UUID_V1_RE.is_match(candidate)
}

/// Returns true for an RFC 4122 version 4 UUID string, case-insensitive.
pub fn is_uuid_v4(candidate: &str) -> bool {
    UUID_V4_RE.is_match(candidate)
}
