use egui::{Pos2, Rect, Vec2};
use tracing::debug;

use crate::settings::SettingsDrag;

/// Pointer sample delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pointer {
    Mouse(Pos2),
    /// Touch sample; `points` is the number of fingers currently down.
    Touch { pos: Pos2, points: usize },
}

impl Pointer {
    /// Position of a mouse or single-finger touch, `None` for multi-touch.
    pub fn single(&self) -> Option<Pos2> {
        match *self {
            Pointer::Mouse(pos) => Some(pos),
            Pointer::Touch { pos, points: 1 } => Some(pos),
            Pointer::Touch { .. } => None,
        }
    }
}

/// Ephemeral state of one pointer-down to pointer-up sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    /// Pointer position relative to the element origin at press time
    pub pointer_offset: Vec2,
    /// Where the pointer went down
    pub press: Pos2,
    /// Viewport the drag is clamped against
    pub viewport: Vec2,
}

/// Clamps `origin` so that an element of `size` stays fully inside `viewport`.
///
/// When the element is larger than the viewport on an axis the origin is
/// pinned to `0` on that axis.
pub fn clamp_to_viewport(origin: Pos2, size: Vec2, viewport: Vec2) -> Pos2 {
    Pos2::new(
        clamp_axis(origin.x, viewport.x - size.x),
        clamp_axis(origin.y, viewport.y - size.y),
    )
}

fn clamp_axis(v: f32, max: f32) -> f32 {
    let max = if max.is_finite() { max.max(0.) } else { 0. };
    if v.is_nan() {
        return 0.;
    }
    v.clamp(0., max)
}

/// Makes a rectangular element repositionable by pointer or touch drag.
///
/// Moves are staged and only committed by [`DraggableSurface::apply_frame`],
/// so any number of move events within one frame cost a single layout.
#[derive(Debug, Clone)]
pub struct DraggableSurface {
    id: String,
    position: Pos2,
    size: Vec2,
    drag: Option<DragState>,
    staged: Option<Pos2>,
    moved: bool,
    settings: SettingsDrag,
}

impl DraggableSurface {
    /// `id` identifies the surface in persistent storage.
    pub fn new(id: impl Into<String>, position: Pos2, size: Vec2, settings: SettingsDrag) -> Self {
        Self {
            id: id.into(),
            position,
            size,
            drag: None,
            staged: None,
            moved: false,
            settings,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Text selection must be disabled on the page while this is true.
    pub fn selection_suppressed(&self) -> bool {
        self.is_dragging()
    }

    /// Whether the last pointer sequence moved far enough to count as a drag.
    ///
    /// Stays set after pointer-up until the next pointer-down.
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// A click following the last pointer sequence should be acted upon.
    pub fn is_click(&self) -> bool {
        !self.moved && !self.is_dragging()
    }

    pub fn settings(&self) -> &SettingsDrag {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SettingsDrag) {
        self.settings = settings;
    }

    /// Records a measured element size. Does not re-clamp the position.
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Places the element without any clamping.
    pub fn set_position(&mut self, position: Pos2) {
        self.position = position;
    }

    /// Starts a drag if the pointer is a mouse or a single touch.
    ///
    /// Returns `false` and leaves the state untouched for multi-touch.
    pub fn pointer_down(&mut self, pointer: Pointer, viewport: Vec2) -> bool {
        let Some(pos) = pointer.single() else {
            return false;
        };

        self.drag = Some(DragState {
            pointer_offset: pos - self.position,
            press: pos,
            viewport,
        });
        self.staged = None;
        self.moved = false;

        debug!(surface = %self.id, x = pos.x, y = pos.y, "drag start");
        true
    }

    /// Stages a new clamped origin for the element.
    ///
    /// Returns `true` if a position was staged. Ignored while not dragging
    /// and for multi-touch samples.
    pub fn pointer_move(&mut self, pointer: Pointer, viewport: Vec2) -> bool {
        let Some(pos) = pointer.single() else {
            return false;
        };
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };

        drag.viewport = viewport;
        if (pos - drag.press).length() > self.settings.click_threshold {
            self.moved = true;
        }

        let origin = pos - drag.pointer_offset;
        self.staged = Some(clamp_to_viewport(origin, self.size, viewport));
        true
    }

    /// Commits the latest staged position, once per animation frame.
    ///
    /// Returns `true` if the position changed.
    pub fn apply_frame(&mut self) -> bool {
        match self.staged.take() {
            Some(pos) if pos != self.position => {
                self.position = pos;
                true
            }
            _ => false,
        }
    }

    /// Ends the drag and returns the final position to persist.
    ///
    /// The position is clamped against the viewport seen during the drag,
    /// which also picks up resizes that happened since the last drag.
    pub fn pointer_up(&mut self) -> Option<Pos2> {
        let drag = self.drag.take()?;
        self.apply_frame();
        self.position = clamp_to_viewport(self.position, self.size, drag.viewport);

        debug!(
            surface = %self.id,
            x = self.position.x,
            y = self.position.y,
            moved = self.moved,
            "drag end"
        );
        Some(self.position)
    }

    /// Aborts the drag without persisting, keeping the committed position.
    pub fn cancel(&mut self) {
        if self.drag.take().is_some() {
            self.staged = None;
            debug!(surface = %self.id, "drag cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800., 600.);

    fn surface() -> DraggableSurface {
        DraggableSurface::new(
            "test",
            Pos2::new(100., 100.),
            Vec2::new(50., 20.),
            SettingsDrag::default(),
        )
    }

    #[test]
    fn test_clamp_to_viewport() {
        let size = Vec2::new(50., 20.);
        assert_eq!(
            clamp_to_viewport(Pos2::new(-10., -5.), size, VIEWPORT),
            Pos2::new(0., 0.)
        );
        assert_eq!(
            clamp_to_viewport(Pos2::new(790., 590.), size, VIEWPORT),
            Pos2::new(750., 580.)
        );
        assert_eq!(
            clamp_to_viewport(Pos2::new(300., 200.), size, VIEWPORT),
            Pos2::new(300., 200.)
        );
    }

    #[test]
    fn test_clamp_element_larger_than_viewport() {
        let pos = clamp_to_viewport(Pos2::new(40., 40.), Vec2::new(900., 700.), VIEWPORT);
        assert_eq!(pos, Pos2::ZERO);
    }

    #[test]
    fn test_clamp_nan_origin() {
        let pos = clamp_to_viewport(Pos2::new(f32::NAN, 10.), Vec2::new(1., 1.), VIEWPORT);
        assert_eq!(pos, Pos2::new(0., 10.));
    }

    #[test]
    fn test_drag_keeps_pointer_offset() {
        let mut s = surface();
        assert!(s.pointer_down(Pointer::Mouse(Pos2::new(110., 105.)), VIEWPORT));
        assert_eq!(s.drag_state().unwrap().pointer_offset, Vec2::new(10., 5.));
        assert!(s.selection_suppressed());

        s.pointer_move(Pointer::Mouse(Pos2::new(210., 305.)), VIEWPORT);
        assert!(s.apply_frame());
        assert_eq!(s.position(), Pos2::new(200., 300.));

        assert_eq!(s.pointer_up(), Some(Pos2::new(200., 300.)));
        assert!(!s.selection_suppressed());
        assert!(s.moved());
    }

    #[test]
    fn test_moves_are_coalesced_per_frame() {
        let mut s = surface();
        s.pointer_down(Pointer::Mouse(Pos2::new(100., 100.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(120., 100.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(140., 100.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(160., 100.)), VIEWPORT);

        // nothing committed until the frame boundary
        assert_eq!(s.position(), Pos2::new(100., 100.));
        assert!(s.apply_frame());
        assert_eq!(s.position(), Pos2::new(160., 100.));
        assert!(!s.apply_frame());
    }

    #[test]
    fn test_pointer_up_commits_staged_move() {
        let mut s = surface();
        s.pointer_down(Pointer::Mouse(Pos2::new(100., 100.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(130., 140.)), VIEWPORT);
        assert_eq!(s.pointer_up(), Some(Pos2::new(130., 140.)));
    }

    #[test]
    fn test_move_clamps_to_viewport() {
        let mut s = surface();
        s.pointer_down(Pointer::Mouse(Pos2::new(100., 100.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(5000., -300.)), VIEWPORT);
        assert_eq!(s.pointer_up(), Some(Pos2::new(750., 0.)));
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut s = surface();
        assert!(!s.pointer_move(Pointer::Mouse(Pos2::new(300., 300.)), VIEWPORT));
        assert!(!s.apply_frame());
        assert_eq!(s.pointer_up(), None);
        assert!(s.is_click());
    }

    #[test]
    fn test_zero_movement_is_a_click() {
        let mut s = surface();
        s.pointer_down(Pointer::Mouse(Pos2::new(110., 110.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(110., 110.)), VIEWPORT);
        s.pointer_up();
        assert!(!s.moved());
        assert!(s.is_click());
    }

    #[test]
    fn test_any_movement_suppresses_click_by_default() {
        let mut s = surface();
        s.pointer_down(Pointer::Mouse(Pos2::new(110., 110.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(111., 110.)), VIEWPORT);
        s.pointer_up();
        assert!(!s.is_click());
    }

    #[test]
    fn test_click_threshold_tolerates_jitter() {
        let mut s = DraggableSurface::new(
            "test",
            Pos2::new(100., 100.),
            Vec2::new(50., 20.),
            SettingsDrag::new().with_click_threshold(4.),
        );
        s.pointer_down(Pointer::Mouse(Pos2::new(110., 110.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(112., 111.)), VIEWPORT);
        s.pointer_up();
        assert!(s.is_click());

        s.pointer_down(Pointer::Mouse(Pos2::new(110., 110.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(120., 110.)), VIEWPORT);
        s.pointer_up();
        assert!(!s.is_click());
    }

    #[test]
    fn test_moved_flag_resets_on_next_press() {
        let mut s = surface();
        s.pointer_down(Pointer::Mouse(Pos2::new(110., 110.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(150., 110.)), VIEWPORT);
        s.pointer_up();
        assert!(s.moved());

        s.pointer_down(Pointer::Mouse(Pos2::new(150., 110.)), VIEWPORT);
        assert!(!s.moved());
    }

    #[test]
    fn test_multi_touch_is_ignored() {
        let mut s = surface();
        let two_fingers = Pointer::Touch {
            pos: Pos2::new(110., 110.),
            points: 2,
        };
        assert!(!s.pointer_down(two_fingers, VIEWPORT));
        assert!(!s.is_dragging());

        let one_finger = Pointer::Touch {
            pos: Pos2::new(110., 110.),
            points: 1,
        };
        assert!(s.pointer_down(one_finger, VIEWPORT));
        assert!(!s.pointer_move(two_fingers, VIEWPORT));
        assert!(!s.moved());
    }

    #[test]
    fn test_resize_does_not_reclamp_until_next_drag() {
        let mut s = DraggableSurface::new(
            "test",
            Pos2::new(700., 500.),
            Vec2::new(50., 20.),
            SettingsDrag::default(),
        );
        let small = Vec2::new(400., 300.);
        s.set_size(Vec2::new(80., 40.));
        assert_eq!(s.position(), Pos2::new(700., 500.));

        s.pointer_down(Pointer::Mouse(Pos2::new(710., 510.)), small);
        assert_eq!(s.pointer_up(), Some(Pos2::new(320., 260.)));
    }

    #[test]
    fn test_cancel_keeps_committed_position() {
        let mut s = surface();
        s.pointer_down(Pointer::Mouse(Pos2::new(100., 100.)), VIEWPORT);
        s.pointer_move(Pointer::Mouse(Pos2::new(200., 100.)), VIEWPORT);
        s.apply_frame();
        s.pointer_move(Pointer::Mouse(Pos2::new(300., 100.)), VIEWPORT);
        s.cancel();
        assert!(!s.is_dragging());
        assert_eq!(s.position(), Pos2::new(200., 100.));
        assert!(!s.apply_frame());
    }
}
