use thiserror::Error;

/// Consumer-facing error taxonomy for the terminal core.
///
/// Internal parsing failures (malformed escapes, unknown CSI finals, invalid
/// UTF-8) never surface here — they are observability signals logged via
/// `tracing`, not errors. Only operations with a real external failure mode
/// (spawning a PTY, writing to one, resizing one, signaling the child) are
/// fallible at this boundary.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("failed to create pty session: {reason}")]
    PtyCreateFailed { reason: String },

    #[error("failed to write to pty: {reason}")]
    WriteFailed { reason: String },

    #[error("session is not running")]
    NotRunning,

    #[error("failed to resize pty: {reason}")]
    ResizeFailed { reason: String },

    #[error("failed to signal child process: {reason}")]
    SignalFailed { reason: String },
}

pub type Result<T> = std::result::Result<T, TerminalError>;
