//! Sample-format plumbing between the capture callbacks and the WAV writer.

/// Average interleaved multi-channel samples down to mono.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear-interpolation resampler. Adequate for speech capture without
/// pulling a polyphase filter into the capture callback.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let index = pos as usize;
        let frac = (pos - index as f64) as f32;
        let a = samples[index];
        let b = if index + 1 < samples.len() {
            samples[index + 1]
        } else {
            a
        };
        out.push(a + (b - a) * frac);
    }
    out
}

/// Interleave loopback (channel 0) and microphone (channel 1) into stereo
/// frames, zero-padding the shorter side.
pub fn interleave_stereo(loopback: &[f32], microphone: &[f32]) -> Vec<f32> {
    let frames = loopback.len().max(microphone.len());
    let mut out = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        out.push(loopback.get(i).copied().unwrap_or(0.0));
        out.push(microphone.get(i).copied().unwrap_or(0.0));
    }
    out
}

/// f32 sample to 16-bit PCM with symmetric clamping.
pub fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_channels() {
        let stereo = [0.2, 0.4, -0.6, -0.2];
        let mono = downmix_to_mono(&stereo, 2);

        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!((mono[1] + 0.4).abs() < 1e-6);
    }

    #[test]
    fn downmix_mono_is_passthrough() {
        let samples = [0.1, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples.to_vec());
    }

    #[test]
    fn resample_same_rate_is_passthrough() {
        let samples = vec![1.0, 2.0, 3.0];
        assert_eq!(resample_linear(&samples, 48_000, 48_000), samples);
    }

    #[test]
    fn resample_upsamples_with_interpolation() {
        let out = resample_linear(&[0.0, 1.0], 24_000, 48_000);

        assert_eq!(out.len(), 4);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn resample_downsamples_to_half() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let out = resample_linear(&samples, 96_000, 48_000);

        assert_eq!(out.len(), 50);
    }

    #[test]
    fn interleave_maps_loopback_left_microphone_right() {
        let out = interleave_stereo(&[0.1, 0.2], &[0.3, 0.4]);

        assert_eq!(out, vec![0.1, 0.3, 0.2, 0.4]);
    }

    #[test]
    fn interleave_pads_the_shorter_side() {
        let out = interleave_stereo(&[0.1], &[0.3, 0.4]);

        assert_eq!(out, vec![0.1, 0.3, 0.0, 0.4]);
    }

    #[test]
    fn to_i16_clamps_out_of_range() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), i16::MAX);
        assert_eq!(to_i16(2.0), i16::MAX);
        assert_eq!(to_i16(-3.0), -i16::MAX);
    }
}
