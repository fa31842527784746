//! The AR session protocol

use arplay_math::{Quat, Vec3};
use async_trait::async_trait;

use crate::error::ArSessionError;
use crate::types::{Anchor, AnchorId, ArFrame, HitTestResult, SessionState};

/// A running AR session, real or simulated
///
/// Calling code gets a `Box<dyn ArSession>` from the factory and must not
/// care which backend it is. Every implementation upholds the same rules:
///
/// - `start` is valid from `Uninitialized` or `Ended`; it is a no-op while active
/// - `stop` never fails and always leaves the session `Ended`, dropping the frame and anchors
/// - `update` produces a fresh frame; the first one moves `Started -> Running`
/// - `hit_test` returns nothing while inactive, otherwise nearest result first
/// - `create_anchor` fails with `NotRunning` while inactive
/// - `remove_anchor` on an unknown id returns false
#[async_trait(?Send)]
pub trait ArSession {
    /// Backend name used in errors and logs
    fn platform(&self) -> &str;

    fn state(&self) -> SessionState;

    fn is_active(&self) -> bool {
        self.state().is_active()
    }

    async fn is_supported(&self) -> bool;

    async fn start(&mut self) -> Result<(), ArSessionError>;

    async fn stop(&mut self);

    /// Advance to a new frame at the host's clock
    fn update(&mut self, timestamp_ms: f64);

    /// Frame from the latest `update`
    fn current_frame(&self) -> Option<&ArFrame>;

    /// Surface hits under a screen point, nearest first
    fn hit_test(&self, x: f32, y: f32) -> Vec<HitTestResult>;

    async fn create_anchor(&mut self, position: Vec3, rotation: Quat) -> Result<Anchor, ArSessionError>;

    fn remove_anchor(&mut self, id: &AnchorId) -> bool;

    /// Anchors in creation order
    fn anchors(&self) -> Vec<&Anchor>;

    fn anchor(&self, id: &AnchorId) -> Option<&Anchor>;
}
