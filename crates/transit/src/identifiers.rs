//! Type-safe, cheap-to-clone identifiers for tracked entities.
//!
//! The realtime server is not consistent about id types (stop ids arrive as
//! numbers, vehicle ids as strings), so every identifier deserializes from
//! either and is normalized to its string form.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentifier {
    Text(String),
    Integer(i64),
    Unsigned(u64),
}

impl RawIdentifier {
    fn into_string(self) -> String {
        match self {
            RawIdentifier::Text(s) => s,
            RawIdentifier::Integer(n) => n.to_string(),
            RawIdentifier::Unsigned(n) => n.to_string(),
        }
    }
}

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Reads an identifier out of a loose JSON value (string or number).
            pub fn from_json(value: &serde_json::Value) -> Option<Self> {
                match value {
                    serde_json::Value::String(s) => Some(Self::new(s)),
                    serde_json::Value::Number(n) => Some(Self::new(n.to_string())),
                    _ => None,
                }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawIdentifier::deserialize(deserializer).map(|raw| Self::new(raw.into_string()))
            }
        }
    };
}

impl_identifier!(VehicleIdentifier);
impl_identifier!(StopIdentifier);
impl_identifier!(RouteIdentifier);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = VehicleIdentifier::new("1432");
        let id2 = VehicleIdentifier::new("1432");
        let id3 = id1.clone();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert!(Arc::ptr_eq(&id1.0, &id3.0)); // Clone shares Arc
    }

    #[test]
    fn test_identifier_hash_and_borrow() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(StopIdentifier::new("901229"), 42);

        assert_eq!(map.get(&StopIdentifier::new("901229")), Some(&42));
        assert_eq!(map.get("901229"), Some(&42));
    }

    #[test]
    fn test_identifier_display() {
        let id = RouteIdentifier::new("110");
        assert_eq!(format!("{}", id), "110");
    }

    #[test]
    fn test_numeric_ids_normalize_to_strings() {
        let from_number: StopIdentifier = serde_json::from_str("901229").unwrap();
        let from_string: StopIdentifier = serde_json::from_str("\"901229\"").unwrap();
        assert_eq!(from_number, from_string);

        let value = serde_json::json!(17);
        assert_eq!(VehicleIdentifier::from_json(&value).unwrap().as_str(), "17");
        assert!(VehicleIdentifier::from_json(&serde_json::json!(null)).is_none());
    }
}
