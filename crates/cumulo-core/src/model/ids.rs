// ── Core identity types ──
//
// Every platform entity is addressed by a GId — the opaque global ID
// the inventory assigns on creation. External IDs (serial numbers and
// friends) map onto GIds through the identity service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The conventional external-ID namespace for device serial numbers.
pub const SERIAL_ID_TYPE: &str = "c8y_Serial";

/// Opaque global identifier for any platform entity.
///
/// The platform assigns these; they are numeric today but documented as
/// opaque strings, so they are never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GId(String);

impl GId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for GId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn gid_display_roundtrip() {
        let id = GId::new("4201");
        assert_eq!(id.to_string(), "4201");
        assert_eq!(id.as_str(), "4201");
    }

    #[test]
    fn gid_from_str() {
        let id: GId = "12345".parse().unwrap();
        assert_eq!(id, GId::new("12345"));
    }

    #[test]
    fn gid_serde_transparent() {
        let id = GId::new("4201");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"4201\"");
        let back: GId = serde_json::from_str("\"4201\"").unwrap();
        assert_eq!(back, id);
    }
}
