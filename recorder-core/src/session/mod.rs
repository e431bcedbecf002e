pub mod capture;

pub use capture::CaptureSession;

use crate::models::error::RecorderError;
use crate::models::result::RecordingResult;

/// Completion callback for an asynchronous start request. Invoked exactly
/// once: synchronously on rejection, from the worker thread otherwise.
pub type StartCompletion = Box<dyn FnOnce(Result<(), RecorderError>) + Send + 'static>;

/// Completion callback for an asynchronous stop request. Invoked exactly
/// once with the finalized recording or the specific failure.
pub type StopCompletion = Box<dyn FnOnce(Result<RecordingResult, RecorderError>) + Send + 'static>;
