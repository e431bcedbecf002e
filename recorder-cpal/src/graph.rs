//! cpal capture graph: two input streams mixed into one stereo WAV.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

use recorder_core::processing::frame_buffer::FrameBuffer;
use recorder_core::processing::meter;
use recorder_core::{AudioDevice, CaptureGraph, ChannelPowerDb, RecorderConfig, RecorderError};

use crate::mix;

/// Drain cadence of the writer loop.
const WRITE_INTERVAL: Duration = Duration::from_millis(100);

/// Ring capacity per input, in seconds of mono samples.
const BUFFER_SECONDS: u32 = 5;

/// How long stream startup may take before the start is failed.
const START_TIMEOUT: Duration = Duration::from_secs(10);

type WavSink = hound::WavWriter<BufWriter<File>>;

/// State shared between the capture callbacks, the I/O thread, and the
/// graph itself.
struct GraphShared {
    loopback_samples: Mutex<FrameBuffer>,
    microphone_samples: Mutex<FrameBuffer>,
    power: Mutex<ChannelPowerDb>,
    running: AtomicBool,
}

struct BoundInputs {
    loopback: AudioDevice,
    microphone: AudioDevice,
    sample_rate: u32,
}

struct ActiveWrite {
    io_thread: thread::JoinHandle<()>,
    finished: Receiver<Result<(), RecorderError>>,
}

/// `CaptureGraph` over two cpal input streams.
///
/// cpal streams are not `Send`, so both live on a dedicated I/O thread for
/// the whole recording; the graph owns only `Send` state and talks to the
/// thread through channels and the liveness flag. The channel mapping is
/// fixed and explicit: loopback → channel 0 (left), microphone → channel 1
/// (right).
pub struct CpalCaptureGraph {
    shared: Arc<GraphShared>,
    bound: Option<BoundInputs>,
    active: Option<ActiveWrite>,
}

impl CpalCaptureGraph {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(GraphShared {
                loopback_samples: Mutex::new(FrameBuffer::new(1)),
                microphone_samples: Mutex::new(FrameBuffer::new(1)),
                power: Mutex::new(ChannelPowerDb::default()),
                running: AtomicBool::new(false),
            }),
            bound: None,
            active: None,
        }
    }

    fn reset_buffers(&self, capacity: usize) {
        *self.shared.loopback_samples.lock() = FrameBuffer::new(capacity);
        *self.shared.microphone_samples.lock() = FrameBuffer::new(capacity);
        *self.shared.power.lock() = ChannelPowerDb::default();
    }
}

impl Default for CpalCaptureGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureGraph for CpalCaptureGraph {
    fn bind(
        &mut self,
        loopback: &AudioDevice,
        microphone: &AudioDevice,
        config: &RecorderConfig,
    ) -> Result<(), RecorderError> {
        if self.active.is_some() {
            return Err(RecorderError::ConfigurationFailed(
                "cannot rebind while writing".into(),
            ));
        }

        // All-or-nothing: verify both devices resolve before keeping either.
        let host = cpal::default_host();
        let loopback_device = find_input(&host, &loopback.id).map_err(|_| {
            RecorderError::ConfigurationFailed(format!("device \"{}\" not found", loopback.name))
        })?;
        let microphone_device = find_input(&host, &microphone.id).map_err(|_| {
            RecorderError::ConfigurationFailed(format!("device \"{}\" not found", microphone.name))
        })?;
        for device in [&loopback_device, &microphone_device] {
            device.default_input_config().map_err(|err| {
                RecorderError::ConfigurationFailed(format!("device has no input config: {err}"))
            })?;
        }

        self.reset_buffers((config.sample_rate * BUFFER_SECONDS) as usize);
        self.bound = Some(BoundInputs {
            loopback: loopback.clone(),
            microphone: microphone.clone(),
            sample_rate: config.sample_rate,
        });
        Ok(())
    }

    fn unbind(&mut self) {
        if self.active.is_some() {
            if let Err(err) = self.finish_writing() {
                log::error!("failed to stop capture streams during unbind: {err}");
            }
        }
        self.bound = None;
        self.reset_buffers(1);
    }

    fn start_writing(&mut self, staging_path: &Path) -> Result<(), RecorderError> {
        let bound = self.bound.as_ref().ok_or_else(|| {
            RecorderError::ConfigurationFailed("capture graph is not bound".into())
        })?;
        if self.active.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }

        // Opening the staging WAV writes the header — the first half of the
        // "encoder began writing" confirmation.
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: bound.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(staging_path, spec).map_err(|err| {
            RecorderError::ConfigurationFailed(format!("cannot open staging file: {err}"))
        })?;

        self.reset_buffers((bound.sample_rate * BUFFER_SECONDS) as usize);
        self.shared.running.store(true, Ordering::SeqCst);

        let (ready_tx, ready_rx) = bounded(1);
        let (finish_tx, finish_rx) = bounded(1);
        let shared = Arc::clone(&self.shared);
        let loopback_id = bound.loopback.id.clone();
        let microphone_id = bound.microphone.id.clone();
        let sample_rate = bound.sample_rate;

        let io_thread = thread::Builder::new()
            .name("capture-io".into())
            .spawn(move || {
                io_thread_main(
                    shared,
                    writer,
                    loopback_id,
                    microphone_id,
                    sample_rate,
                    ready_tx,
                    finish_tx,
                )
            })
            .map_err(|err| {
                RecorderError::ConfigurationFailed(format!("cannot spawn capture thread: {err}"))
            })?;

        // Second half of the confirmation: both streams are playing.
        match ready_rx.recv_timeout(START_TIMEOUT) {
            Ok(Ok(())) => {
                self.active = Some(ActiveWrite {
                    io_thread,
                    finished: finish_rx,
                });
                Ok(())
            }
            Ok(Err(err)) => {
                self.shared.running.store(false, Ordering::SeqCst);
                let _ = io_thread.join();
                Err(err)
            }
            Err(_) => {
                self.shared.running.store(false, Ordering::SeqCst);
                let _ = io_thread.join();
                Err(RecorderError::ConfigurationFailed(
                    "capture start timed out".into(),
                ))
            }
        }
    }

    fn finish_writing(&mut self) -> Result<(), RecorderError> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };

        self.shared.running.store(false, Ordering::SeqCst);
        active.io_thread.join().map_err(|_| {
            RecorderError::FinalizationFailed("capture I/O thread panicked".into())
        })?;
        active.finished.recv().map_err(|_| {
            RecorderError::FinalizationFailed("capture I/O thread exited without a result".into())
        })?
    }

    fn channel_power(&self) -> ChannelPowerDb {
        *self.shared.power.lock()
    }

    fn container_ext(&self) -> &'static str {
        "wav"
    }
}

/// Runs on the dedicated I/O thread: owns both cpal streams and the WAV
/// writer for the lifetime of one recording.
fn io_thread_main(
    shared: Arc<GraphShared>,
    mut writer: WavSink,
    loopback_id: String,
    microphone_id: String,
    sample_rate: u32,
    ready_tx: Sender<Result<(), RecorderError>>,
    finish_tx: Sender<Result<(), RecorderError>>,
) {
    let streams = match build_streams(&shared, &loopback_id, &microphone_id, sample_rate) {
        Ok(streams) => streams,
        Err(err) => {
            let _ = ready_tx.send(Err(err));
            return;
        }
    };
    let _ = ready_tx.send(Ok(()));

    while shared.running.load(Ordering::SeqCst) {
        thread::sleep(WRITE_INTERVAL);
        // A failed drain skips the tick; the tail drain below reports.
        if let Err(err) = drain_frames(&shared, &mut writer, false) {
            log::error!("failed to write audio frames: {err}");
        }
    }

    // Stop capturing before the tail drain so no samples arrive mid-flush.
    drop(streams);
    let result = drain_frames(&shared, &mut writer, true).and_then(|()| {
        writer.finalize().map_err(|err| {
            RecorderError::FinalizationFailed(format!("cannot finalize staging file: {err}"))
        })
    });
    let _ = finish_tx.send(result);
}

struct ActiveStreams {
    _loopback: cpal::Stream,
    _microphone: cpal::Stream,
}

fn build_streams(
    shared: &Arc<GraphShared>,
    loopback_id: &str,
    microphone_id: &str,
    sample_rate: u32,
) -> Result<ActiveStreams, RecorderError> {
    let host = cpal::default_host();
    let loopback = find_input(&host, loopback_id)?;
    let microphone = find_input(&host, microphone_id)?;

    let loopback_stream = build_input_stream(&loopback, Arc::clone(shared), true, sample_rate)?;
    let microphone_stream =
        build_input_stream(&microphone, Arc::clone(shared), false, sample_rate)?;

    loopback_stream
        .play()
        .map_err(|err| RecorderError::ConfigurationFailed(format!("cannot start stream: {err}")))?;
    microphone_stream
        .play()
        .map_err(|err| RecorderError::ConfigurationFailed(format!("cannot start stream: {err}")))?;

    Ok(ActiveStreams {
        _loopback: loopback_stream,
        _microphone: microphone_stream,
    })
}

/// A device that vanished between bind and start surfaces as
/// `DevicesUnavailable` through the start completion.
fn find_input(host: &cpal::Host, id: &str) -> Result<cpal::Device, RecorderError> {
    host.input_devices()
        .map_err(|err| {
            RecorderError::ConfigurationFailed(format!("device enumeration failed: {err}"))
        })?
        .find(|device| device.name().map(|name| name == id).unwrap_or(false))
        .ok_or(RecorderError::DevicesUnavailable)
}

fn build_input_stream(
    device: &cpal::Device,
    shared: Arc<GraphShared>,
    is_loopback: bool,
    out_rate: u32,
) -> Result<cpal::Stream, RecorderError> {
    let supported = device.default_input_config().map_err(|err| {
        RecorderError::ConfigurationFailed(format!("device has no input config: {err}"))
    })?;
    let channels = supported.channels() as usize;
    let in_rate = supported.sample_rate().0;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.config();

    let err_fn = |err: cpal::StreamError| log::error!("input stream error: {err}");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                handle_chunk(&shared, is_loopback, data, channels, in_rate, out_rate);
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let samples: Vec<f32> =
                    data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                handle_chunk(&shared, is_loopback, &samples, channels, in_rate, out_rate);
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_input_stream(
            &config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                let samples: Vec<f32> =
                    data.iter().map(|&s| s as f32 / 32_768.0 - 1.0).collect();
                handle_chunk(&shared, is_loopback, &samples, channels, in_rate, out_rate);
            },
            err_fn,
            None,
        ),
        other => {
            return Err(RecorderError::ConfigurationFailed(format!(
                "unsupported sample format: {other:?}"
            )))
        }
    }
    .map_err(|err| RecorderError::ConfigurationFailed(format!("cannot open input stream: {err}")))?;

    Ok(stream)
}

/// Capture callback tail: downmix, resample to the output rate, update the
/// per-role meter, queue for the writer.
fn handle_chunk(
    shared: &GraphShared,
    is_loopback: bool,
    data: &[f32],
    channels: usize,
    in_rate: u32,
    out_rate: u32,
) {
    let mono = mix::downmix_to_mono(data, channels);
    let resampled = mix::resample_linear(&mono, in_rate, out_rate);
    let db = meter::power_db(meter::rms(&resampled));

    {
        let mut power = shared.power.lock();
        if is_loopback {
            power.loopback_db = db;
        } else {
            power.microphone_db = db;
        }
    }

    let buffer = if is_loopback {
        &shared.loopback_samples
    } else {
        &shared.microphone_samples
    };
    buffer.lock().push(&resampled);
}

/// Pair queued loopback and microphone samples into interleaved stereo
/// frames and write them out. Steady-state drains only what both sides can
/// cover; the tail drain pads the shorter side with silence.
fn drain_frames(
    shared: &GraphShared,
    writer: &mut WavSink,
    flush_tail: bool,
) -> Result<(), RecorderError> {
    let (left, right) = {
        let mut loopback = shared.loopback_samples.lock();
        let mut microphone = shared.microphone_samples.lock();
        let frames = if flush_tail {
            loopback.len().max(microphone.len())
        } else {
            loopback.len().min(microphone.len())
        };
        if frames == 0 {
            return Ok(());
        }
        (loopback.pop(frames), microphone.pop(frames))
    };

    for sample in mix::interleave_stereo(&left, &right) {
        writer.write_sample(mix::to_i16(sample)).map_err(|err| {
            RecorderError::FinalizationFailed(format!("wav write failed: {err}"))
        })?;
    }
    Ok(())
}
