//! Signal level metering and meter-scale conversion.

/// Power reported for silence, in dBFS.
pub const SILENCE_FLOOR_DB: f32 = -120.0;

/// Bottom of the visible meter range; anything quieter renders as zero.
pub const METER_FLOOR_DB: f32 = -60.0;

/// Root-mean-square level of a sample block.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Convert a linear RMS level to average power in dBFS.
pub fn power_db(rms: f32) -> f32 {
    if rms <= 0.0 {
        return SILENCE_FLOOR_DB;
    }
    (20.0 * rms.log10()).max(SILENCE_FLOOR_DB)
}

/// Map average power in dB onto the 0..1 meter scale.
///
/// Exponential ramp over `METER_FLOOR_DB`..0 dB, rescaled so the endpoints
/// land exactly on 0 and 1; inputs outside the range clamp, non-finite
/// inputs read as silence.
pub fn normalized_level(db: f32) -> f32 {
    if db.is_nan() {
        return 0.0;
    }
    let span = 10f32.powf(-METER_FLOOR_DB / 20.0) - 1.0;
    let raw = (10f32.powf((db - METER_FLOOR_DB) / 20.0) - 1.0) / span;
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn rms_of_full_scale() {
        assert_relative_eq!(rms(&[1.0, -1.0, 1.0]), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn power_db_of_full_scale_is_zero() {
        assert_relative_eq!(power_db(1.0), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn power_db_of_silence_hits_floor() {
        assert_eq!(power_db(0.0), SILENCE_FLOOR_DB);
        assert_eq!(power_db(-1.0), SILENCE_FLOOR_DB);
    }

    #[test]
    fn normalized_endpoints() {
        assert_eq!(normalized_level(METER_FLOOR_DB), 0.0);
        assert_relative_eq!(normalized_level(0.0), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn normalized_clamps_out_of_range() {
        assert_eq!(normalized_level(-90.0), 0.0);
        assert_eq!(normalized_level(-1000.0), 0.0);
        assert_eq!(normalized_level(6.0), 1.0);
        assert_eq!(normalized_level(f32::NEG_INFINITY), 0.0);
        assert_eq!(normalized_level(f32::INFINITY), 1.0);
        assert_eq!(normalized_level(f32::NAN), 0.0);
    }

    #[test]
    fn normalized_is_monotonic() {
        let mut last = normalized_level(-130.0);
        let mut db = -129.0;
        while db <= 10.0 {
            let next = normalized_level(db);
            assert!(
                next >= last,
                "normalized level decreased between {} and {} dB",
                db - 1.0,
                db
            );
            last = next;
            db += 1.0;
        }
    }

    #[test]
    fn normalized_stays_in_unit_range() {
        for db in [-500.0, -61.0, -59.9, -30.0, -0.1, 0.1, 120.0] {
            let n = normalized_level(db);
            assert!((0.0..=1.0).contains(&n), "{} dB mapped to {}", db, n);
        }
    }
}
