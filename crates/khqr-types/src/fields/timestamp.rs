//! Creation timestamp (tag `99`).
//!
//! Bakong stamps each payload with the wall-clock time it was generated, in
//! milliseconds since the Unix epoch. The clock is abstracted behind [`Clock`]
//! so that payloads can be reproduced exactly in tests.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::time::{Duration, SystemTime};

use super::{check_length, element};
use crate::catalog::{Field, FieldCatalog, FieldDefinition};
use crate::error::EncodeError;
use crate::tlv::TlvElement;

/// Milliseconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// Serialized as a stringified integer, which is how it appears inside the
/// payload and keeps JSON consumers from losing precision.
///
/// ```
/// use khqr_types::fields::UnixMillis;
///
/// let ts = UnixMillis::from_millis(1_700_000_000_123);
/// assert_eq!(ts.to_string(), "1700000000123");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct UnixMillis(u64);

impl UnixMillis {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Converts a [`SystemTime`]. Times before the epoch clamp to zero.
    pub fn from_system_time(time: SystemTime) -> Self {
        let millis = time
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis();
        Self(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl Display for UnixMillis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for UnixMillis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for UnixMillis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let millis = s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("timestamp must be a non-negative integer"))?;
        Ok(UnixMillis(millis))
    }
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> UnixMillis;
}

/// Reads [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixMillis {
        UnixMillis::from_system_time(SystemTime::now())
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub UnixMillis);

impl Clock for FixedClock {
    fn now(&self) -> UnixMillis {
        self.0
    }
}

/// Encodes the current time as sub-element `00` inside template `99`.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    template: FieldDefinition,
    millis: FieldDefinition,
}

impl Timestamp {
    pub fn new(catalog: &FieldCatalog) -> Self {
        Self {
            template: *catalog.definition(Field::Timestamp),
            millis: *catalog.definition(Field::LanguagePreference),
        }
    }

    pub fn encode(&self, clock: &impl Clock) -> Result<TlvElement, EncodeError> {
        self.encode_at(clock.now())
    }

    pub fn encode_at(&self, at: UnixMillis) -> Result<TlvElement, EncodeError> {
        let millis = at.to_string();
        check_length(&self.millis, &millis)?;
        let inner = element(&self.millis, millis)?;
        Ok(TlvElement::nested(self.template.tag, &[inner])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_encoding() {
        let encoder = Timestamp::new(&FieldCatalog::khqr());
        let clock = FixedClock(UnixMillis::from_millis(1_700_000_000_123));
        let element = encoder.encode(&clock).unwrap();
        assert_eq!(element.to_string(), "991700131700000000123");
    }

    #[test]
    fn test_system_clock_is_recent() {
        let encoder = Timestamp::new(&FieldCatalog::khqr());
        let element = encoder.encode(&SystemClock).unwrap();
        assert_eq!(element.tag(), "99");
        let children = element.children().unwrap();
        assert_eq!(children[0].tag(), "00");
        let millis: u64 = children[0].value().parse().unwrap();
        // After 2020-01-01.
        assert!(millis > 1_577_836_800_000);
    }

    #[test]
    fn test_pre_epoch_clamps() {
        let before = SystemTime::UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(UnixMillis::from_system_time(before).as_millis(), 0);
    }

    #[test]
    fn test_serde_as_string() {
        let ts = UnixMillis::from_millis(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"42\"");
        let back: UnixMillis = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back, ts);
        assert!(serde_json::from_str::<UnixMillis>("\"-1\"").is_err());
    }
}
