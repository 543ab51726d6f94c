use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Consensus timestamp with nanosecond precision.
///
/// Field order gives the derived ordering: seconds first, then nanos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl Timestamp {
    /// The Unix epoch, the default start of every topic query.
    pub const EPOCH: Timestamp = Timestamp {
        seconds: 0,
        nanos: 0,
    };

    pub fn new(seconds: i64, nanos: u32) -> Result<Self, CoreError> {
        if nanos >= 1_000_000_000 {
            return Err(CoreError::InvalidTimestamp(format!(
                "nanos out of range: {}",
                nanos
            )));
        }
        Ok(Self { seconds, nanos })
    }

    pub fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    /// Last representable instant within the given second.
    pub fn end_of_second(seconds: i64) -> Self {
        Self {
            seconds,
            nanos: 999_999_999,
        }
    }

    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// The next representable instant, used as an exclusive lower bound.
    pub fn next_nano(&self) -> Self {
        if self.nanos == 999_999_999 {
            Self {
                seconds: self.seconds + 1,
                nanos: 0,
            }
        } else {
            Self {
                seconds: self.seconds,
                nanos: self.nanos + 1,
            }
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanos).single()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// Consensus topic identifier in `shard.realm.num` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl TopicId {
    pub fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }
}

impl FromStr for TopicId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            CoreError::InvalidTopicId(format!(
                "Invalid TopicId format. Expected 'shard.realm.num', got '{}'",
                s
            ))
        };

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut nums = [0u64; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self::new(nums[0], nums[1], nums[2]))
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl Serialize for TopicId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TopicId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A raw message delivered by the topic feed.
///
/// Immutable once produced; ordered by `(consensus_timestamp, sequence_number)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
    pub topic_id: TopicId,
    pub sequence_number: u64,
    pub consensus_timestamp: Timestamp,
    pub payload: Vec<u8>,
}

impl TopicMessage {
    /// Feed ordering key.
    pub fn order_key(&self) -> (Timestamp, u64) {
        (self.consensus_timestamp, self.sequence_number)
    }

    /// Lossy UTF-8 view of the payload, for diagnostics.
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_ordering() {
        let a = Timestamp::new(100, 5).unwrap();
        let b = Timestamp::new(100, 6).unwrap();
        let c = Timestamp::new(101, 0).unwrap();
        assert!(a < b);
        assert!(b < c);
        assert!(Timestamp::EPOCH < a);
    }

    #[test]
    fn test_timestamp_rejects_bad_nanos() {
        assert!(Timestamp::new(1, 1_000_000_000).is_err());
    }

    #[test]
    fn test_next_nano_rolls_over() {
        let t = Timestamp::end_of_second(7);
        assert_eq!(t.next_nano(), Timestamp::from_seconds(8));
        assert_eq!(
            Timestamp::from_seconds(7).next_nano(),
            Timestamp::new(7, 1).unwrap()
        );
    }

    #[test]
    fn test_timestamp_display() {
        let t = Timestamp::new(12, 34).unwrap();
        assert_eq!(t.to_string(), "12.000000034");
    }

    #[test]
    fn test_timestamp_datetime_roundtrip() {
        let t = Timestamp::new(1_700_000_000, 123).unwrap();
        let dt = t.to_datetime().unwrap();
        assert_eq!(Timestamp::from(dt), t);
    }

    #[test]
    fn test_topic_id_parse() {
        let id: TopicId = "0.0.29613327".parse().unwrap();
        assert_eq!(id, TopicId::new(0, 0, 29613327));
        assert_eq!(id.to_string(), "0.0.29613327");
    }

    #[test]
    fn test_topic_id_rejects_invalid() {
        for bad in ["", "invalid_topic_id", "0.0", "0.0.1.2", "0.0.x", "0..1", "0.0.-1", "0.0.1=1"] {
            let err = bad.parse::<TopicId>().unwrap_err();
            assert!(
                err.to_string().contains("Expected 'shard.realm.num'"),
                "unexpected error for {bad:?}: {err}"
            );
        }
    }

    #[test]
    fn test_topic_id_serde_as_string() {
        let id = TopicId::new(0, 0, 5);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0.0.5\"");
        let back: TopicId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_message_order_key() {
        let msg = TopicMessage {
            topic_id: TopicId::new(0, 0, 1),
            sequence_number: 3,
            consensus_timestamp: Timestamp::from_seconds(10),
            payload: b"hi".to_vec(),
        };
        assert_eq!(msg.order_key(), (Timestamp::from_seconds(10), 3));
        assert_eq!(msg.payload_lossy(), "hi");
    }
}
