//! Session factory
//!
//! The factory hides the real-versus-simulated choice. Callers receive a
//! `Box<dyn ArSession>` and drive it the same way whichever backend it is.

use crate::capability::{detect_ar_mode, ArMode, CapabilityReport};
use crate::runtime::{ArRuntime, RuntimeSession, UnavailableRuntime};
use crate::session::ArSession;
use crate::simulated::SimulatedSession;
use crate::types::SessionConfig;

/// Builds a session by probing capability
///
/// # Example
/// ```ignore
/// let session = SessionFactory::new(SessionConfig::default())
///     .with_runtime(Box::new(my_runtime))
///     .create()
///     .await;
/// ```
pub struct SessionFactory {
    config: SessionConfig,
    runtime: Option<Box<dyn ArRuntime>>,
    forced: Option<ArMode>,
}

impl SessionFactory {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            runtime: None,
            forced: None,
        }
    }

    /// Offer a platform runtime to probe
    pub fn with_runtime(mut self, runtime: Box<dyn ArRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Skip probing and use the given mode
    pub fn with_forced_mode(mut self, mode: Option<ArMode>) -> Self {
        self.forced = mode;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub async fn probe(&self) -> CapabilityReport {
        detect_ar_mode(self.forced, self.runtime.as_deref()).await
    }

    pub async fn create(self) -> Box<dyn ArSession> {
        self.create_with_report().await.0
    }

    /// Create the session and return the probe outcome that chose it
    ///
    /// Forcing real mode without a runtime yields a session whose `start`
    /// fails with `NotSupported`.
    pub async fn create_with_report(self) -> (Box<dyn ArSession>, CapabilityReport) {
        let report = self.probe().await;
        log::info!("AR mode: {} ({})", report.mode, report.reason);

        let session: Box<dyn ArSession> = match (report.mode, self.runtime) {
            (ArMode::Real, Some(runtime)) => Box::new(RuntimeSession::new(runtime, self.config)),
            (ArMode::Real, None) => Box::new(RuntimeSession::new(Box::new(UnavailableRuntime), self.config)),
            (ArMode::Simulated, _) => Box::new(SimulatedSession::new(self.config)),
        };
        (session, report)
    }
}
