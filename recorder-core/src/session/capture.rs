//! The capture session: recording state machine and output finalization.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use chrono::{DateTime, Local, Utc};
use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;

use crate::catalog::DeviceCatalog;
use crate::models::config::RecorderConfig;
use crate::models::device::{DeviceAvailability, SharedAvailability};
use crate::models::error::RecorderError;
use crate::models::levels::ChannelPowerDb;
use crate::models::result::RecordingResult;
use crate::models::state::SessionState;
use crate::traits::capture_graph::CaptureGraph;
use crate::traits::device_registry::DeviceRegistry;
use crate::traits::observer::RecorderObserver;

use super::{StartCompletion, StopCompletion};

/// An in-flight recording. Exists only between an accepted start and the
/// end of finalization; recording writes only ever target the staging path.
struct RecordingOperation {
    staging_path: PathBuf,
    final_path: PathBuf,
    started_at: Instant,
    started_wall: DateTime<Utc>,
}

impl RecordingOperation {
    fn generate(config: &RecorderConfig, ext: &str) -> Self {
        let staging_path = config
            .staging_dir
            .join(format!("staging-{}.{}", uuid::Uuid::new_v4(), ext));
        let timestamp = Local::now().format("%Y%m%d-%H%M%S");
        let final_path = config
            .recordings_dir
            .join(format!("Recording-{}.{}", timestamp, ext));
        Self {
            staging_path,
            final_path,
            started_at: Instant::now(),
            started_wall: Utc::now(),
        }
    }
}

/// Mutable session state. Every transition goes through this one mutex, so
/// no two transitions can be in flight concurrently.
struct Inner<G> {
    state: SessionState,
    graph: G,
    operation: Option<RecordingOperation>,
}

enum Command {
    Start(StartCompletion),
    Stop(StopCompletion),
    Shutdown,
}

/// Owns the capture graph and the recording state machine.
///
/// Start/stop are asynchronous: accepted calls are queued onto a dedicated
/// worker thread that drives the graph and reports through the completion
/// callback once the encoder confirms the transition. Rejections are
/// delivered synchronously through the same callback, so each call sees
/// exactly one completion.
pub struct CaptureSession<G: CaptureGraph + 'static> {
    inner: Arc<Mutex<Inner<G>>>,
    observer: Arc<dyn RecorderObserver>,
    availability: SharedAvailability,
    config: RecorderConfig,
    commands: Sender<Command>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<G: CaptureGraph + 'static> CaptureSession<G> {
    pub fn new(
        graph: G,
        config: RecorderConfig,
        availability: SharedAvailability,
        observer: Arc<dyn RecorderObserver>,
    ) -> Self {
        let inner = Arc::new(Mutex::new(Inner {
            state: SessionState::Idle,
            graph,
            operation: None,
        }));
        let (commands, queue) = unbounded();

        let worker = {
            let inner = Arc::clone(&inner);
            let observer = Arc::clone(&observer);
            thread::Builder::new()
                .name("capture-worker".into())
                .spawn(move || {
                    while let Ok(command) = queue.recv() {
                        match command {
                            Command::Start(done) => Self::run_start(&inner, &observer, done),
                            Command::Stop(done) => Self::run_stop(&inner, &observer, done),
                            Command::Shutdown => break,
                        }
                    }
                })
                .expect("failed to spawn capture worker")
        };

        Self {
            inner,
            observer,
            availability,
            config,
            commands,
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Per-role power for the level monitor; `None` unless recording.
    pub fn current_power(&self) -> Option<ChannelPowerDb> {
        let inner = self.inner.lock();
        if inner.state.is_recording() {
            Some(inner.graph.channel_power())
        } else {
            None
        }
    }

    /// Configure: idle → configuring → ready.
    ///
    /// All-or-nothing: a failure leaves nothing bound and the session back
    /// in `Idle`, so a retry starts from scratch.
    pub fn configure<R: DeviceRegistry>(
        &self,
        catalog: &DeviceCatalog<R>,
    ) -> Result<(), RecorderError> {
        let mut inner = self.inner.lock();
        if !inner.state.is_idle() {
            return Err(RecorderError::ConfigurationFailed(
                "can only configure from idle state".into(),
            ));
        }
        self.config
            .validate()
            .map_err(RecorderError::ConfigurationFailed)?;

        inner.state = SessionState::Configuring;

        let resolved = catalog
            .find_loopback()
            .and_then(|loopback| catalog.default_microphone().map(|mic| (loopback, mic)));
        let (loopback, microphone) = match resolved {
            Ok(pair) => pair,
            Err(err) => return Self::fail_configure(inner, &self.observer, err),
        };

        if let Err(err) = inner.graph.bind(&loopback, &microphone, &self.config) {
            inner.graph.unbind();
            let err = RecorderError::ConfigurationFailed(err.to_string());
            return Self::fail_configure(inner, &self.observer, err);
        }

        *self.availability.lock() = DeviceAvailability {
            loopback_available: true,
            microphone_available: true,
        };
        inner.state = SessionState::Ready;
        drop(inner);
        self.observer.on_state_changed(SessionState::Ready);
        log::info!(
            "capture graph bound: loopback=\"{}\" microphone=\"{}\"",
            loopback.name,
            microphone.name
        );
        Ok(())
    }

    fn fail_configure(
        mut inner: parking_lot::MutexGuard<'_, Inner<G>>,
        observer: &Arc<dyn RecorderObserver>,
        err: RecorderError,
    ) -> Result<(), RecorderError> {
        inner.state = SessionState::Idle;
        drop(inner);
        observer.on_state_changed(SessionState::Failed);
        observer.on_state_changed(SessionState::Idle);
        Err(err)
    }

    /// Queue an asynchronous start.
    ///
    /// Rejected synchronously with `AlreadyRecording` while an operation is
    /// in flight, `ConfigurationFailed` when not configured, and
    /// `DevicesUnavailable` when the cached availability says either device
    /// is gone. An accepted start completes only after the encoder confirms
    /// it has begun writing.
    pub fn start(&self, completion: StartCompletion) {
        let mut inner = self.inner.lock();

        if inner.operation.is_some() || inner.state.is_busy() {
            drop(inner);
            completion(Err(RecorderError::AlreadyRecording));
            return;
        }
        if !inner.state.is_ready() {
            drop(inner);
            completion(Err(RecorderError::ConfigurationFailed(
                "session is not configured".into(),
            )));
            return;
        }
        if !self.availability.lock().both_available() {
            drop(inner);
            completion(Err(RecorderError::DevicesUnavailable));
            return;
        }
        if let Err(err) = fs::create_dir_all(&self.config.recordings_dir) {
            drop(inner);
            completion(Err(RecorderError::ConfigurationFailed(format!(
                "cannot create recordings directory: {err}"
            ))));
            return;
        }

        let ext = inner.graph.container_ext();
        inner.operation = Some(RecordingOperation::generate(&self.config, ext));
        drop(inner);

        if let Err(rejected) = self.commands.send(Command::Start(completion)) {
            if let Command::Start(done) = rejected.into_inner() {
                done(Err(RecorderError::ConfigurationFailed(
                    "capture worker unavailable".into(),
                )));
            }
        }
    }

    /// Queue an asynchronous stop. Rejected synchronously with
    /// `NotRecording` (and no filesystem writes) unless recording.
    pub fn stop(&self, completion: StopCompletion) {
        let mut inner = self.inner.lock();
        if !inner.state.is_recording() || inner.operation.is_none() {
            drop(inner);
            completion(Err(RecorderError::NotRecording));
            return;
        }
        inner.state = SessionState::Finalizing;
        drop(inner);
        self.observer.on_state_changed(SessionState::Finalizing);

        if let Err(rejected) = self.commands.send(Command::Stop(completion)) {
            if let Command::Stop(done) = rejected.into_inner() {
                done(Err(RecorderError::FinalizationFailed(
                    "capture worker unavailable".into(),
                )));
            }
        }
    }

    /// Force the session back to idle: best-effort stop of an in-flight
    /// recording, staging file deleted, graph unbound. Errors are logged,
    /// never surfaced. Safe to call repeatedly and from any state.
    pub fn teardown(&self) {
        let mut inner = self.inner.lock();
        if let Some(operation) = inner.operation.take() {
            if let Err(err) = inner.graph.finish_writing() {
                log::error!("failed to stop in-flight recording during teardown: {err}");
            }
            remove_quietly(&operation.staging_path);
        }
        inner.graph.unbind();
        let was_idle = inner.state.is_idle();
        inner.state = SessionState::Idle;
        drop(inner);
        if !was_idle {
            self.observer.on_state_changed(SessionState::Idle);
        }
    }

    fn run_start(
        inner: &Arc<Mutex<Inner<G>>>,
        observer: &Arc<dyn RecorderObserver>,
        completion: StartCompletion,
    ) {
        let mut guard = inner.lock();
        let staging = match guard.operation.as_ref() {
            Some(op) => op.staging_path.clone(),
            // Torn down between acceptance and execution.
            None => {
                drop(guard);
                completion(Err(RecorderError::NotRecording));
                return;
            }
        };

        match guard.graph.start_writing(&staging) {
            Ok(()) => {
                guard.state = SessionState::Recording;
                drop(guard);
                log::info!("recording started, staging at {}", staging.display());
                observer.on_state_changed(SessionState::Recording);
                completion(Ok(()));
            }
            Err(err) => {
                guard.operation = None;
                guard.graph.unbind();
                guard.state = SessionState::Idle;
                drop(guard);
                remove_quietly(&staging);
                observer.on_state_changed(SessionState::Failed);
                observer.on_state_changed(SessionState::Idle);
                completion(Err(err));
            }
        }
    }

    fn run_stop(
        inner: &Arc<Mutex<Inner<G>>>,
        observer: &Arc<dyn RecorderObserver>,
        completion: StopCompletion,
    ) {
        let mut guard = inner.lock();
        let Some(operation) = guard.operation.take() else {
            drop(guard);
            completion(Err(RecorderError::NotRecording));
            return;
        };

        match Self::finalize(&mut guard.graph, &operation) {
            Ok(result) => {
                guard.state = SessionState::Idle;
                drop(guard);
                log::info!("recording saved to {}", result.file_path.display());
                observer.on_state_changed(SessionState::Idle);
                observer.on_recording_finished(&result);
                completion(Ok(result));
            }
            Err(err) => {
                guard.state = SessionState::Idle;
                drop(guard);
                remove_quietly(&operation.staging_path);
                // Absence, never corruption, at the final path: a stale file
                // must not outlive a failed finalization either.
                if operation.final_path.exists() {
                    remove_quietly(&operation.final_path);
                }
                observer.on_state_changed(SessionState::Failed);
                observer.on_state_changed(SessionState::Idle);
                completion(Err(err));
            }
        }
    }

    /// Close the staging file and promote it to the final path.
    ///
    /// The rename is the atomicity boundary: a reader of the recordings
    /// directory sees either no file or a complete one, never a partial
    /// write. On failure the final path is left absent.
    fn finalize(graph: &mut G, operation: &RecordingOperation) -> Result<RecordingResult, RecorderError> {
        graph
            .finish_writing()
            .map_err(|err| RecorderError::FinalizationFailed(err.to_string()))?;

        if operation.final_path.exists() {
            fs::remove_file(&operation.final_path).map_err(|err| {
                RecorderError::FinalizationFailed(format!(
                    "cannot replace {}: {err}",
                    operation.final_path.display()
                ))
            })?;
        }
        fs::rename(&operation.staging_path, &operation.final_path).map_err(|err| {
            RecorderError::FinalizationFailed(format!("cannot promote staging file: {err}"))
        })?;

        Ok(RecordingResult {
            file_path: operation.final_path.clone(),
            duration_secs: operation.started_at.elapsed().as_secs_f64(),
            started_at: operation.started_wall,
        })
    }
}

impl<G: CaptureGraph + 'static> Drop for CaptureSession<G> {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

fn remove_quietly(path: &std::path::Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            log::error!("failed to remove staging file {}: {err}", path.display());
        }
    }
}
