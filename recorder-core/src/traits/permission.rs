use crate::models::error::RecorderError;

/// Pass-through to the OS audio-capture permission facility.
pub trait PermissionGate: Send + Sync {
    /// Resolve capture permission, blocking until the platform grants or
    /// denies. `Ok(false)` is a denial, not an error; callers treat it as
    /// terminal and do not retry automatically.
    fn request_access(&self) -> Result<bool, RecorderError>;
}
