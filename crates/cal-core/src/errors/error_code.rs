//! Stable error codes for run reports.

/// Every error enum maps its variants to a code string that stays stable
/// across message rewording, so reports can be grouped by kind.
pub trait CalErrorCode {
    /// Returns the error code (e.g. `"CONFIG_ERROR"`).
    fn error_code(&self) -> &'static str;

    /// Returns `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const UNKNOWN_SAMPLER: &str = "UNKNOWN_SAMPLER";
pub const INVARIANT_VIOLATION: &str = "INVARIANT_VIOLATION";
pub const ROUND_FAILURE: &str = "ROUND_FAILURE";
pub const SAMPLING_ERROR: &str = "SAMPLING_ERROR";
pub const PROJECTION_FAILED: &str = "PROJECTION_FAILED";
