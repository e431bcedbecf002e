use serde::{Deserialize, Serialize};

use crate::processing::meter;

/// Raw per-role average signal power in dBFS, exposed by the capture graph.
///
/// Keyed by role rather than channel index: the graph owns the role→channel
/// mapping and validates it at bind time, so a reordered channel layout can
/// never silently swap the meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelPowerDb {
    pub loopback_db: f32,
    pub microphone_db: f32,
}

impl Default for ChannelPowerDb {
    fn default() -> Self {
        Self {
            loopback_db: meter::SILENCE_FLOOR_DB,
            microphone_db: meter::SILENCE_FLOOR_DB,
        }
    }
}

/// One tick of the level monitor: raw power plus the normalized meter scale.
/// Ephemeral; produced on every tick while recording, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioLevelSample {
    pub loopback_db: f32,
    pub microphone_db: f32,
    pub normalized_loopback: f32,
    pub normalized_microphone: f32,
}

impl AudioLevelSample {
    pub fn from_power(power: ChannelPowerDb) -> Self {
        Self {
            loopback_db: power.loopback_db,
            microphone_db: power.microphone_db,
            normalized_loopback: meter::normalized_level(power.loopback_db),
            normalized_microphone: meter::normalized_level(power.microphone_db),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_power_is_silence() {
        let sample = AudioLevelSample::from_power(ChannelPowerDb::default());
        assert_eq!(sample.normalized_loopback, 0.0);
        assert_eq!(sample.normalized_microphone, 0.0);
    }

    #[test]
    fn from_power_keeps_raw_db() {
        let power = ChannelPowerDb {
            loopback_db: -20.0,
            microphone_db: -40.0,
        };
        let sample = AudioLevelSample::from_power(power);
        assert_eq!(sample.loopback_db, -20.0);
        assert_eq!(sample.microphone_db, -40.0);
        assert!(sample.normalized_loopback > sample.normalized_microphone);
    }
}
