//! Error types for the energy-wave core.

use thiserror::Error;

/// Errors produced by engine, surface, and host operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero, negative, or not finite.
    #[error("invalid dimensions: width and height must be positive and finite")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The host refused to schedule a frame or register a listener.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// The drawing surface or its 2D context could not be obtained.
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Snapshot or filesystem failure.
    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = EngineError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_color_includes_input() {
        let msg = EngineError::InvalidColor("#zzz".into()).to_string();
        assert!(msg.contains("#zzz"), "missing color in: {msg}");
    }

    #[test]
    fn scheduler_error_includes_reason() {
        let msg = EngineError::Scheduler("requestAnimationFrame failed".into()).to_string();
        assert!(msg.contains("requestAnimationFrame"), "missing reason in: {msg}");
    }

    #[test]
    fn surface_unavailable_includes_reason() {
        let msg = EngineError::SurfaceUnavailable("no 2d context".into()).to_string();
        assert!(msg.contains("2d context"), "missing reason in: {msg}");
    }

    #[test]
    fn io_error_includes_message() {
        let msg = EngineError::Io("disk full".into()).to_string();
        assert!(msg.contains("disk full"), "missing message in: {msg}");
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
