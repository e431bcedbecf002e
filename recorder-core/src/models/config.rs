use std::path::PathBuf;

/// Capture configuration.
///
/// The output format is fixed for the product (48 kHz stereo); the
/// directories are the deployment-specific knobs.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Directory holding finalized recordings. Created on first use.
    pub recordings_dir: PathBuf,

    /// Staging area for in-flight recordings. Staging files carry
    /// randomized names and are never exposed to external consumers.
    pub staging_dir: PathBuf,

    /// Output sample rate in Hz.
    pub sample_rate: u32,

    /// Output channel count. The capture graph maps loopback → channel 0,
    /// microphone → channel 1.
    pub channels: u16,
}

impl RecorderConfig {
    pub fn new(recordings_dir: impl Into<PathBuf>) -> Self {
        Self {
            recordings_dir: recordings_dir.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels != 2 {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.recordings_dir.as_os_str().is_empty() {
            return Err("recordings directory must be set".into());
        }
        Ok(())
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            recordings_dir: PathBuf::from("recordings"),
            staging_dir: std::env::temp_dir(),
            sample_rate: 48_000,
            channels: 2,
        }
    }
}
