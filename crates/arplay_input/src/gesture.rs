//! Gesture recognition from raw pointer samples
//!
//! Gestures:
//! - Tap: pointer released near where it went down, before the long-press time
//! - Double tap: a tap within the double-tap window of a previous single tap
//! - Long press: pointer released near its start after the long-press time
//! - Drag: single pointer moving; carries the offset from the start position
//! - Pinch / Rotate: two pointers moving; scale and angle relative to the gesture start
//!
//! The recognizer never reads a clock. Every [`PointerEvent`] carries its own
//! timestamp, so the same input sequence always yields the same gestures.

use std::collections::HashMap;

use arplay_math::Vec2;

/// Identifier of a touch point or mouse button
pub type PointerId = u64;

/// Changes in rotation smaller than this are not reported
const ROTATION_EPSILON: f32 = 1e-3;

/// Pointers closer than this have no meaningful pinch baseline
const MIN_PINCH_DISTANCE: f32 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One raw pointer sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub phase: PointerPhase,
    /// Screen position in pixels, origin top-left
    pub position: Vec2,
    pub timestamp_ms: f64,
}

impl PointerEvent {
    pub fn new(id: PointerId, phase: PointerPhase, position: Vec2, timestamp_ms: f64) -> Self {
        Self { id, phase, position, timestamp_ms }
    }

    pub fn down(id: PointerId, position: Vec2, timestamp_ms: f64) -> Self {
        Self::new(id, PointerPhase::Down, position, timestamp_ms)
    }

    pub fn moved(id: PointerId, position: Vec2, timestamp_ms: f64) -> Self {
        Self::new(id, PointerPhase::Move, position, timestamp_ms)
    }

    pub fn up(id: PointerId, position: Vec2, timestamp_ms: f64) -> Self {
        Self::new(id, PointerPhase::Up, position, timestamp_ms)
    }

    pub fn cancel(id: PointerId, position: Vec2, timestamp_ms: f64) -> Self {
        Self::new(id, PointerPhase::Cancel, position, timestamp_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Tap,
    DoubleTap,
    LongPress,
    Drag,
    Pinch,
    Rotate,
}

/// A recognised gesture
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Tap { position: Vec2, timestamp_ms: f64 },
    DoubleTap { position: Vec2, timestamp_ms: f64 },
    LongPress { position: Vec2, timestamp_ms: f64 },
    /// `delta` is measured from where the pointer went down
    Drag { position: Vec2, delta: Vec2, timestamp_ms: f64 },
    /// `scale` is current pointer distance over the distance at gesture start
    Pinch { position: Vec2, scale: f32, timestamp_ms: f64 },
    /// `rotation` is in radians, counter-clockwise on screen
    Rotate { position: Vec2, rotation: f32, timestamp_ms: f64 },
}

impl GestureEvent {
    pub fn kind(&self) -> GestureKind {
        match self {
            GestureEvent::Tap { .. } => GestureKind::Tap,
            GestureEvent::DoubleTap { .. } => GestureKind::DoubleTap,
            GestureEvent::LongPress { .. } => GestureKind::LongPress,
            GestureEvent::Drag { .. } => GestureKind::Drag,
            GestureEvent::Pinch { .. } => GestureKind::Pinch,
            GestureEvent::Rotate { .. } => GestureKind::Rotate,
        }
    }

    pub fn position(&self) -> Vec2 {
        match *self {
            GestureEvent::Tap { position, .. }
            | GestureEvent::DoubleTap { position, .. }
            | GestureEvent::LongPress { position, .. }
            | GestureEvent::Drag { position, .. }
            | GestureEvent::Pinch { position, .. }
            | GestureEvent::Rotate { position, .. } => position,
        }
    }

    pub fn timestamp_ms(&self) -> f64 {
        match *self {
            GestureEvent::Tap { timestamp_ms, .. }
            | GestureEvent::DoubleTap { timestamp_ms, .. }
            | GestureEvent::LongPress { timestamp_ms, .. }
            | GestureEvent::Drag { timestamp_ms, .. }
            | GestureEvent::Pinch { timestamp_ms, .. }
            | GestureEvent::Rotate { timestamp_ms, .. } => timestamp_ms,
        }
    }
}

/// Recognition thresholds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    /// Max gap between two taps for a double tap
    pub double_tap_ms: f64,
    /// Min hold time for a long press
    pub long_press_ms: f64,
    /// Max movement in pixels for a tap or long press
    pub tap_move_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_tap_ms: 300.0,
            long_press_ms: 500.0,
            tap_move_threshold: 10.0,
        }
    }
}

/// Handle returned by [`GestureRecognizer::on`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Gesture callback
pub type GestureListener = Box<dyn FnMut(&GestureEvent)>;

/// A pointer currently down
#[derive(Clone, Copy, Debug)]
struct ActivePointer {
    id: PointerId,
    start: Vec2,
    current: Vec2,
    start_ms: f64,
    /// Took part in a two-pointer gesture; never classified as a tap
    multi: bool,
}

/// Distance and angle between the two pointers when the pinch began
#[derive(Clone, Copy, Debug)]
struct PinchBaseline {
    distance: f32,
    angle: f32,
}

/// Turns pointer samples into gesture events
pub struct GestureRecognizer {
    config: GestureConfig,
    /// Active pointers in the order they went down
    pointers: Vec<ActivePointer>,
    last_tap_ms: Option<f64>,
    pinch: Option<PinchBaseline>,
    listeners: HashMap<GestureKind, Vec<(ListenerId, GestureListener)>>,
    next_listener: u64,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            pointers: Vec::new(),
            last_tap_ms: None,
            pinch: None,
            listeners: HashMap::new(),
            next_listener: 0,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Subscribe to one gesture kind
    ///
    /// Listeners for a kind run in registration order.
    pub fn on(&mut self, kind: GestureKind, listener: impl FnMut(&GestureEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.entry(kind).or_default().push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe; returns false if `id` was not registered for `kind`
    pub fn off(&mut self, kind: GestureKind, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(listener_id, _)| *listener_id != id);
        list.len() != before
    }

    pub fn listener_count(&self, kind: GestureKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Feed one pointer sample
    ///
    /// Recognised gestures are delivered to listeners before this returns,
    /// and are also returned in emission order.
    pub fn handle(&mut self, event: PointerEvent) -> Vec<GestureEvent> {
        let gestures = match event.phase {
            PointerPhase::Down => {
                self.pointer_down(event);
                Vec::new()
            }
            PointerPhase::Move => self.pointer_move(event),
            PointerPhase::Up => self.pointer_up(event),
            PointerPhase::Cancel => {
                self.remove_pointer(event.id);
                Vec::new()
            }
        };

        for gesture in &gestures {
            log::debug!("{:?} at {}", gesture.kind(), gesture.position());
            self.emit(gesture);
        }
        gestures
    }

    fn pointer_down(&mut self, event: PointerEvent) {
        self.remove_pointer(event.id);
        self.pointers.push(ActivePointer {
            id: event.id,
            start: event.position,
            current: event.position,
            start_ms: event.timestamp_ms,
            multi: false,
        });

        if self.pointers.len() == 2 {
            for pointer in &mut self.pointers {
                pointer.multi = true;
            }
            let (a, b) = (self.pointers[0].current, self.pointers[1].current);
            self.pinch = Some(PinchBaseline {
                distance: a.distance(b),
                angle: angle_between(a, b),
            });
        } else {
            self.pinch = None;
        }
    }

    fn pointer_move(&mut self, event: PointerEvent) -> Vec<GestureEvent> {
        let Some(pointer) = self.pointers.iter_mut().find(|p| p.id == event.id) else {
            log::debug!("Move for unknown pointer {}", event.id);
            return Vec::new();
        };
        pointer.current = event.position;
        let start = pointer.start;

        match self.pointers.len() {
            1 => vec![GestureEvent::Drag {
                position: event.position,
                delta: event.position - start,
                timestamp_ms: event.timestamp_ms,
            }],
            2 => self.two_pointer_gestures(event.timestamp_ms),
            _ => Vec::new(),
        }
    }

    fn two_pointer_gestures(&self, timestamp_ms: f64) -> Vec<GestureEvent> {
        let Some(baseline) = self.pinch else {
            return Vec::new();
        };
        let (a, b) = (self.pointers[0].current, self.pointers[1].current);
        let center = (a + b) * 0.5;
        let mut out = Vec::new();

        if baseline.distance > MIN_PINCH_DISTANCE {
            out.push(GestureEvent::Pinch {
                position: center,
                scale: a.distance(b) / baseline.distance,
                timestamp_ms,
            });
        }

        let rotation = wrap_angle(angle_between(a, b) - baseline.angle);
        if rotation.abs() > ROTATION_EPSILON {
            out.push(GestureEvent::Rotate {
                position: center,
                rotation,
                timestamp_ms,
            });
        }
        out
    }

    fn pointer_up(&mut self, event: PointerEvent) -> Vec<GestureEvent> {
        let Some(pointer) = self.remove_pointer(event.id) else {
            return Vec::new();
        };
        if pointer.multi {
            return Vec::new();
        }

        let moved = event.position.distance(pointer.start);
        if moved >= self.config.tap_move_threshold {
            return Vec::new();
        }

        let position = event.position;
        let timestamp_ms = event.timestamp_ms;
        let held = timestamp_ms - pointer.start_ms;

        if held >= self.config.long_press_ms {
            return vec![GestureEvent::LongPress { position, timestamp_ms }];
        }

        let is_double = self
            .last_tap_ms
            .is_some_and(|last| timestamp_ms - last < self.config.double_tap_ms);

        if is_double {
            self.last_tap_ms = None;
            vec![GestureEvent::DoubleTap { position, timestamp_ms }]
        } else {
            self.last_tap_ms = Some(timestamp_ms);
            vec![GestureEvent::Tap { position, timestamp_ms }]
        }
    }

    fn remove_pointer(&mut self, id: PointerId) -> Option<ActivePointer> {
        let index = self.pointers.iter().position(|p| p.id == id)?;
        let pointer = self.pointers.remove(index);
        if self.pointers.len() < 2 {
            self.pinch = None;
        }
        Some(pointer)
    }

    fn emit(&mut self, gesture: &GestureEvent) {
        if let Some(list) = self.listeners.get_mut(&gesture.kind()) {
            for (_, listener) in list.iter_mut() {
                listener(gesture);
            }
        }
    }

    /// Current position of every pointer that is down
    pub fn active_pointers(&self) -> Vec<(PointerId, Vec2)> {
        self.pointers.iter().map(|p| (p.id, p.current)).collect()
    }

    /// Forget all pointers and the double-tap window; listeners are kept
    pub fn clear(&mut self) {
        self.pointers.clear();
        self.pinch = None;
        self.last_tap_ms = None;
    }
}

fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    d.y.atan2(d.x)
}

/// Wrap into (-PI, PI]
fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}
