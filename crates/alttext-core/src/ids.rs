use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn from_raw(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Canvas object identity. Assigned by the host, never minted here.
opaque_id!(NodeId);

// One complete scan result set. Completions carrying a different ScanId are stale.
opaque_id!(ScanId);

impl ScanId {
    pub fn new() -> Self {
        Self(format!("scan_{}", Uuid::now_v7()))
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::from_raw(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_id_has_prefix() {
        let id = ScanId::new();
        assert!(id.as_str().starts_with("scan_"), "got: {id}");
    }

    #[test]
    fn scan_ids_are_unique() {
        assert_ne!(ScanId::new(), ScanId::new());
    }

    #[test]
    fn node_id_preserves_host_value() {
        let id = NodeId::from_raw("aZ9-node");
        assert_eq!(id.as_str(), "aZ9-node");
        assert_eq!(id.to_string(), "aZ9-node");
        assert_eq!(NodeId::from("aZ9-node"), id);
    }

    #[test]
    fn node_id_serializes_transparently() {
        let id = NodeId::from_raw("42");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""42""#);
        let parsed: NodeId = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(parsed, id);
    }
}
