//! Session error types

/// Error surfaced by session operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArSessionError {
    /// The platform cannot provide AR
    NotSupported { platform: String, reason: String },
    /// AR was available but acquiring the session failed
    StartFailed { platform: String, reason: String },
    /// The operation needs a started session
    NotRunning { platform: String },
    AnchorFailed { platform: String, reason: String },
}

impl ArSessionError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ArSessionError::NotSupported { .. } => "NOT_SUPPORTED",
            ArSessionError::StartFailed { .. } => "START_FAILED",
            ArSessionError::NotRunning { .. } => "NOT_RUNNING",
            ArSessionError::AnchorFailed { .. } => "ANCHOR_FAILED",
        }
    }

    pub fn platform(&self) -> &str {
        match self {
            ArSessionError::NotSupported { platform, .. }
            | ArSessionError::StartFailed { platform, .. }
            | ArSessionError::NotRunning { platform }
            | ArSessionError::AnchorFailed { platform, .. } => platform,
        }
    }
}

impl std::fmt::Display for ArSessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArSessionError::NotSupported { platform, reason } => {
                write!(f, "{} AR is not supported: {}", platform, reason)
            }
            ArSessionError::StartFailed { platform, reason } => {
                write!(f, "Failed to start {} session: {}", platform, reason)
            }
            ArSessionError::NotRunning { platform } => write!(f, "{} session is not running", platform),
            ArSessionError::AnchorFailed { platform, reason } => {
                write!(f, "{} anchor creation failed: {}", platform, reason)
            }
        }
    }
}

impl std::error::Error for ArSessionError {}

/// Error reported by an external AR runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PlatformError {}
