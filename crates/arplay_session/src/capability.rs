//! AR capability probing
//!
//! Decides between a real and a simulated session. Probe failures never
//! propagate: they downgrade to simulated mode with the reason recorded.

use serde::{Deserialize, Serialize};

use crate::runtime::ArRuntime;

/// Which backend a session uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArMode {
    Real,
    Simulated,
}

impl std::fmt::Display for ArMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArMode::Real => write!(f, "real"),
            ArMode::Simulated => write!(f, "simulated"),
        }
    }
}

/// Why the probe fell back to simulated mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Downgrade {
    /// Simulated mode was requested explicitly
    Forced,
    NoRuntime,
    Unsupported,
    /// The runtime's support check returned an error
    ProbeFailed,
}

/// Outcome of a capability probe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub mode: ArMode,
    /// Human-readable detail for logs
    pub reason: String,
    /// True only when real AR is expected to work
    pub supported: bool,
    downgrade: Option<Downgrade>,
}

impl CapabilityReport {
    fn real(reason: String) -> Self {
        Self {
            mode: ArMode::Real,
            reason,
            supported: true,
            downgrade: None,
        }
    }

    fn simulated(cause: Downgrade, reason: String) -> Self {
        Self {
            mode: ArMode::Simulated,
            reason,
            supported: false,
            downgrade: Some(cause),
        }
    }

    /// Cause of a fallback to simulated mode; `None` in real mode
    #[inline]
    pub fn downgrade(&self) -> Option<Downgrade> {
        self.downgrade
    }
}

/// Probe for real AR, honouring a forced mode
pub async fn detect_ar_mode(force: Option<ArMode>, runtime: Option<&dyn ArRuntime>) -> CapabilityReport {
    if let Some(mode) = force {
        let reason = format!("Mode forced to '{}'", mode);
        return match mode {
            ArMode::Real => CapabilityReport::real(reason),
            ArMode::Simulated => CapabilityReport::simulated(Downgrade::Forced, reason),
        };
    }

    let Some(runtime) = runtime else {
        return CapabilityReport::simulated(Downgrade::NoRuntime, "No AR runtime available".to_string());
    };

    let platform = runtime.platform();
    match runtime.is_supported().await {
        Ok(true) => CapabilityReport::real(format!("{} immersive AR is supported", platform)),
        Ok(false) => CapabilityReport::simulated(
            Downgrade::Unsupported,
            format!("{} available but immersive AR is not supported", platform),
        ),
        Err(e) => {
            log::debug!("AR probe error: {}", e);
            CapabilityReport::simulated(Downgrade::ProbeFailed, format!("{} check failed: {}", platform, e))
        }
    }
}

/// User-facing description of the probe outcome
pub fn availability_message(report: &CapabilityReport) -> &'static str {
    match report.downgrade() {
        None => "AR hardware detected - running in AR mode",
        Some(Downgrade::Forced) => "AR simulator mode (developer override)",
        Some(Downgrade::NoRuntime) => "AR simulator mode - no AR runtime on this platform",
        Some(Downgrade::Unsupported) => "AR simulator mode - AR is not available on this device",
        Some(Downgrade::ProbeFailed) => "AR simulator mode - AR hardware not detected",
    }
}
