use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Monotonic revision number assigned by the upstream system
///
/// Serialized as a decimal string, which is how the feed contract reports
/// `fromRevision`, `toRevision` and per-record revisions. Deserialization
/// accepts both strings and unsigned integers so seed files can use plain
/// numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(u64);

impl Revision {
    pub const ZERO: Revision = Revision(0);
    pub const MAX: Revision = Revision(u64::MAX);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The revision immediately after this one, saturating at `MAX`
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<u64> for Revision {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Revision {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Revision)
    }
}

impl Serialize for Revision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RevisionVisitor;

        impl<'de> Visitor<'de> for RevisionVisitor {
            type Value = Revision;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-negative revision number or numeric string")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Revision, E> {
                Ok(Revision(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Revision, E> {
                u64::try_from(value)
                    .map(Revision)
                    .map_err(|_| E::custom(format!("negative revision {}", value)))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Revision, E> {
                value
                    .parse()
                    .map_err(|_| E::custom(format!("invalid revision '{}'", value)))
            }
        }

        deserializer.deserialize_any(RevisionVisitor)
    }
}

/// Anything positioned at a single revision
pub trait Revisioned {
    fn revision(&self) -> Revision;
}

impl Revisioned for Revision {
    fn revision(&self) -> Revision {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Revision::new(42)).unwrap();
        assert_eq!(json, "\"42\"");
    }

    #[test]
    fn test_deserializes_from_number_or_string() {
        let from_num: Revision = serde_json::from_str("7").unwrap();
        let from_str: Revision = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(from_num, from_str);
        assert!(serde_json::from_str::<Revision>("-1").is_err());
        assert!(serde_json::from_str::<Revision>("\"seven\"").is_err());
    }

    #[test]
    fn test_next_saturates() {
        assert_eq!(Revision::new(1).next(), Revision::new(2));
        assert_eq!(Revision::MAX.next(), Revision::MAX);
    }
}
