//! Backend substitutability tests
//!
//! The same call sequence runs against every backend the factory can
//! return. Each check is a protocol rule, not a backend detail:
//! 1. Queries before `start` return empty results, not errors
//! 2. `start -> update -> hit_test -> create_anchor -> stop` succeeds
//! 3. `stop` is idempotent and always ends in `Ended`

use arplay_math::{mat4, Quat, Vec2, Vec3};
use arplay_session::{
    ArCamera, ArFrame, ArMode, ArPlane, ArRuntime, ArSession, AnchorId, HitTestResult, PlaneOrientation,
    PlatformError, SessionConfig, SessionFactory, SessionState, TrackingState,
};
use async_trait::async_trait;
use pollster::block_on;

/// Minimal well-behaved platform runtime
struct MockRuntime;

impl MockRuntime {
    fn floor() -> ArPlane {
        ArPlane {
            id: "floor".to_string(),
            transform: mat4::translation(Vec3::new(0.0, -1.0, 0.0)),
            extent: Vec2::new(4.0, 4.0),
            orientation: PlaneOrientation::Horizontal,
            center: Vec3::new(0.0, -1.0, 0.0),
            tracking: true,
        }
    }
}

#[async_trait(?Send)]
impl ArRuntime for MockRuntime {
    fn platform(&self) -> &str {
        "Mock"
    }

    async fn is_supported(&self) -> Result<bool, PlatformError> {
        Ok(true)
    }

    async fn request_session(&mut self, _config: &SessionConfig) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn end_session(&mut self) {}

    fn poll_frame(&mut self, timestamp_ms: f64) -> Option<ArFrame> {
        Some(ArFrame {
            timestamp_ms,
            camera: ArCamera {
                transform: mat4::IDENTITY,
                projection: mat4::perspective(1.0, 1.0, 0.1, 50.0),
                tracking_state: TrackingState::Limited,
            },
            planes: vec![Self::floor()],
            light_estimate: None,
        })
    }

    fn hit_test(&self, _x: f32, _y: f32) -> Vec<HitTestResult> {
        vec![
            HitTestResult {
                position: Vec3::new(0.0, -1.0, -4.0),
                rotation: Quat::IDENTITY,
                distance: 4.1,
                plane: Some(Self::floor()),
            },
            HitTestResult {
                position: Vec3::new(0.0, -1.0, -1.0),
                rotation: Quat::IDENTITY,
                distance: 1.4,
                plane: Some(Self::floor()),
            },
        ]
    }

    async fn create_anchor(&mut self, _id: &AnchorId, _position: Vec3, _rotation: Quat) -> Result<(), PlatformError> {
        Ok(())
    }

    fn remove_anchor(&mut self, _id: &AnchorId) {}
}

fn backends() -> Vec<(&'static str, Box<dyn ArSession>)> {
    let simulated = block_on(SessionFactory::new(SessionConfig::default()).create());
    let real = block_on(
        SessionFactory::new(SessionConfig::default())
            .with_runtime(Box::new(MockRuntime))
            .create(),
    );
    vec![("simulated", simulated), ("mock real", real)]
}

/// Run the protocol sequence and check every post-condition
fn exercise(label: &str, session: &mut dyn ArSession) {
    assert_eq!(session.state(), SessionState::Uninitialized, "{}", label);
    assert!(session.hit_test(10.0, 10.0).is_empty(), "{}: hit_test before start", label);
    assert!(session.current_frame().is_none(), "{}", label);
    let err = block_on(session.create_anchor(Vec3::ZERO, Quat::IDENTITY));
    assert_eq!(err.map_err(|e| e.code()).err(), Some("NOT_RUNNING"), "{}", label);

    block_on(session.start()).unwrap_or_else(|e| panic!("{}: start failed: {}", label, e));
    session.update(16.0);
    assert_eq!(session.state(), SessionState::Running, "{}", label);
    assert_eq!(session.current_frame().map(|f| f.timestamp_ms), Some(16.0), "{}", label);

    let hits = session.hit_test(640.0, 360.0);
    assert!(!hits.is_empty(), "{}: hit_test while running", label);
    for pair in hits.windows(2) {
        assert!(pair[0].distance <= pair[1].distance, "{}: hits not ranked", label);
    }

    let anchor = block_on(session.create_anchor(hits[0].position, hits[0].rotation))
        .unwrap_or_else(|e| panic!("{}: create_anchor failed: {}", label, e));
    assert!((anchor.position() - hits[0].position).length() < 1e-4, "{}", label);
    assert_eq!(session.anchors().len(), 1, "{}", label);
    assert!(!session.remove_anchor(&AnchorId::new("nope")), "{}", label);

    block_on(session.stop());
    block_on(session.stop());
    assert_eq!(session.state(), SessionState::Ended, "{}", label);
    assert!(session.anchors().is_empty(), "{}", label);
    assert!(session.current_frame().is_none(), "{}", label);
    assert!(session.hit_test(10.0, 10.0).is_empty(), "{}: hit_test after stop", label);
}

#[test]
fn test_backends_follow_the_same_protocol() {
    for (label, mut session) in backends() {
        exercise(label, session.as_mut());
    }
}

#[test]
fn test_factory_picks_backend_by_probe() {
    let (_, report) = block_on(
        SessionFactory::new(SessionConfig::default())
            .with_runtime(Box::new(MockRuntime))
            .create_with_report(),
    );
    assert_eq!(report.mode, ArMode::Real);

    let (session, report) = block_on(
        SessionFactory::new(SessionConfig::default())
            .with_runtime(Box::new(MockRuntime))
            .with_forced_mode(Some(ArMode::Simulated))
            .create_with_report(),
    );
    assert_eq!(report.mode, ArMode::Simulated);
    assert_eq!(session.platform(), "Simulated");
}

#[test]
fn test_sessions_restart_after_stop() {
    for (label, mut session) in backends() {
        block_on(session.start()).unwrap();
        block_on(session.stop());
        block_on(session.start()).unwrap_or_else(|e| panic!("{}: restart failed: {}", label, e));
        assert!(session.is_active(), "{}", label);
    }
}
