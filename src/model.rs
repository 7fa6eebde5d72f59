//! The S2 FRBC entity shapes, as handed over by the deserialization layer.

pub mod actuator;
pub mod forecast;
pub mod id;
pub mod leakage;
pub mod operation_mode;
pub mod range;
pub mod storage;
pub mod system;
pub mod target;
pub mod timeline;
pub mod timer;
pub mod transition;

/// `TimeDelta` as a number of seconds on the wire.
pub(crate) mod serde_time_delta {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        #[expect(clippy::cast_precision_loss)]
        serializer.serialize_f64(delta.num_milliseconds() as f64 / 1_000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        #[expect(clippy::cast_possible_truncation)]
        Ok(TimeDelta::milliseconds((seconds * 1_000.0).round() as i64))
    }
}

pub(crate) mod serde_opt_time_delta {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        delta: &Option<TimeDelta>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match delta {
            Some(delta) => super::serde_time_delta::serialize(delta, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TimeDelta>, D::Error> {
        let seconds = Option::<f64>::deserialize(deserializer)?;
        #[expect(clippy::cast_possible_truncation)]
        Ok(seconds.map(|seconds| TimeDelta::milliseconds((seconds * 1_000.0).round() as i64)))
    }
}
