//! Error types for frame capture.
//!
//! Decode problems never show up here; they are handled inside the decoder.
//! These errors cover the radio lifecycle: acquiring the interface, stopping
//! the capture loop, and the source going away.

/// Result type alias for scanner operations.
pub type Result<T> = std::result::Result<T, ScannerError>;

/// Errors that can occur while capturing frames.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// The radio interface could not be acquired.
    #[error("Failed to acquire hci{interface}: {message}")]
    AcquisitionFailed { interface: u16, message: String },

    /// `start()` was called while the capture loop is running.
    #[error("Scanner is already running")]
    AlreadyRunning,

    /// No frame source is available to start capturing from.
    #[error("Frame source unavailable: {message}")]
    SourceUnavailable { message: String },

    /// The capture loop did not acknowledge the stop signal in time.
    #[error("Capture loop did not stop within {duration_ms}ms")]
    StopTimeout { duration_ms: u64 },

    /// The capture task terminated abnormally.
    #[error("Capture task failed: {message}")]
    TaskFailed { message: String },

    /// The frame source is not connected or has been disconnected.
    #[error("Frame source disconnected: {device}")]
    Disconnected { device: String },

    /// The frame source delivered data that is not a frame.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScannerError {
    /// Create a new acquisition failure.
    pub fn acquisition_failed(interface: u16, message: impl Into<String>) -> Self {
        Self::AcquisitionFailed {
            interface,
            message: message.into(),
        }
    }

    /// Create a new source unavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
        }
    }

    /// Create a new stop timeout error.
    pub fn stop_timeout(duration_ms: u64) -> Self {
        Self::StopTimeout { duration_ms }
    }

    /// Create a new task failure.
    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Whether the source is gone and the capture loop should end.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_failed_error() {
        let error = ScannerError::acquisition_failed(0, "Device or resource busy");
        assert!(matches!(error, ScannerError::AcquisitionFailed { .. }));
        assert_eq!(
            error.to_string(),
            "Failed to acquire hci0: Device or resource busy"
        );
    }

    #[test]
    fn test_stop_timeout_error() {
        let error = ScannerError::stop_timeout(10_000);
        assert_eq!(
            error.to_string(),
            "Capture loop did not stop within 10000ms"
        );
    }

    #[test]
    fn test_disconnect_classification() {
        assert!(ScannerError::disconnected("mock").is_disconnect());
        assert!(!ScannerError::invalid_data("odd").is_disconnect());
        assert!(!ScannerError::AlreadyRunning.is_disconnect());
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            ScannerError::source_unavailable("lost"),
            ScannerError::task_failed("panicked"),
            ScannerError::invalid_data("line 3"),
        ];

        for error in errors {
            let _ = format!("{}", error);
            let _ = format!("{:?}", error);
        }
    }
}
