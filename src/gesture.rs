//! Translates pointer drag gestures into background pan updates.

use crate::layout::Pan;

/// Amplifies drag deltas so a short drag over the downscaled preview moves
/// the full-resolution image a proportional distance.
pub const PAN_SENSITIVITY: f64 = 2.5;

/// Absolute pointer position, from a mouse or the first touch point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerPos {
    pub x: f64,
    pub y: f64,
}

impl PointerPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One active drag: the pointer-down position and the pan at that moment.
/// Created on gesture start, discarded on gesture end.
#[derive(Debug, Copy, Clone)]
pub struct DragSession {
    start: PointerPos,
    origin: Pan,
}

impl DragSession {
    pub fn begin(start: PointerPos, origin: Pan) -> Self {
        Self { start, origin }
    }

    /// Pan for the current pointer position, per-axis:
    /// `origin + (pointer - start) * sensitivity`.
    pub fn pan_at(&self, at: PointerPos) -> Pan {
        Pan {
            x: self.origin.x + (at.x - self.start.x) * PAN_SENSITIVITY,
            y: self.origin.y + (at.y - self.start.y) * PAN_SENSITIVITY,
        }
    }
}

/// Routes pointer-down/move/up sequences into pan values. Mouse and touch
/// feed the same three entry points.
#[derive(Debug, Default)]
pub struct PanTranslator {
    session: Option<DragSession>,
}

impl PanTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn pointer_down(&mut self, at: PointerPos, current: Pan) {
        self.session = Some(DragSession::begin(at, current));
    }

    /// Returns the updated pan while a session is active, `None` otherwise.
    pub fn pointer_move(&mut self, at: PointerPos) -> Option<Pan> {
        self.session.as_ref().map(|s| s.pan_at(at))
    }

    /// Ends the gesture; pointer-up and pointer-leave both land here.
    pub fn pointer_up(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drag_delta_is_scaled() {
        let mut t = PanTranslator::new();
        t.pointer_down(PointerPos::new(100.0, 100.0), Pan::default());
        let pan = t.pointer_move(PointerPos::new(110.0, 100.0)).unwrap();
        assert_eq!(pan, Pan { x: 25.0, y: 0.0 });
    }

    #[test]
    fn drag_accumulates_from_snapshot() {
        let mut t = PanTranslator::new();
        t.pointer_down(PointerPos::new(0.0, 0.0), Pan { x: 40.0, y: -10.0 });
        let pan = t.pointer_move(PointerPos::new(-4.0, 8.0)).unwrap();
        assert_eq!(pan, Pan { x: 30.0, y: 10.0 });
    }

    #[test]
    fn moves_without_a_session_are_ignored() {
        let mut t = PanTranslator::new();
        assert_eq!(t.pointer_move(PointerPos::new(5.0, 5.0)), None);
        assert!(!t.is_dragging());
    }

    #[test]
    fn pointer_up_ends_the_session() {
        let mut t = PanTranslator::new();
        t.pointer_down(PointerPos::new(0.0, 0.0), Pan::default());
        assert!(t.is_dragging());
        t.pointer_up();
        assert!(!t.is_dragging());
        assert_eq!(t.pointer_move(PointerPos::new(1.0, 1.0)), None);
    }

    #[test]
    fn new_gesture_snapshots_the_latest_pan() {
        let mut t = PanTranslator::new();
        t.pointer_down(PointerPos::new(0.0, 0.0), Pan::default());
        let first = t.pointer_move(PointerPos::new(10.0, 0.0)).unwrap();
        t.pointer_up();

        t.pointer_down(PointerPos::new(50.0, 50.0), first);
        let second = t.pointer_move(PointerPos::new(50.0, 54.0)).unwrap();
        assert_eq!(second, Pan { x: 25.0, y: 10.0 });
    }
}
