use super::*;

/// The affine mapping between world (map-pixel) space and screen space,
/// plus the modal drag-pan state.
///
/// `screen = world * scale + translate`; the inverse is exact up to
/// floating-point rounding. Scale is always kept inside
/// `[SCALE_MIN, SCALE_MAX]`.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub(super) struct ViewportTransform {
    scale: f32,
    translate: Vec2,
    drag_anchor: Option<Vec2>,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
            drag_anchor: None,
        }
    }
}

impl ViewportTransform {
    pub(super) fn scale(&self) -> f32 {
        self.scale
    }

    pub(super) fn translate(&self) -> Vec2 {
        self.translate
    }

    pub(super) fn zoom_in(&mut self) {
        self.scale = (self.scale / SCALE_STEP).clamp(SCALE_MIN, SCALE_MAX);
    }

    pub(super) fn zoom_out(&mut self) {
        self.scale = (self.scale * SCALE_STEP).clamp(SCALE_MIN, SCALE_MAX);
    }

    /// Starts a drag-pan anchored at `screen_point`. Returns false without
    /// touching state when a drag is already active.
    pub(super) fn begin_drag(&mut self, screen_point: Vec2) -> bool {
        if self.drag_anchor.is_some() {
            return false;
        }
        self.drag_anchor = Some(screen_point - self.translate);
        true
    }

    pub(super) fn drag_to(&mut self, screen_point: Vec2) {
        if let Some(anchor) = self.drag_anchor {
            self.translate = screen_point - anchor;
        }
    }

    pub(super) fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub(super) fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub(super) fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.translate
    }

    pub(super) fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.translate) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_in_steps_up_by_inverse_scale_step() {
        let mut viewport = ViewportTransform::default();
        viewport.zoom_in();
        assert!((viewport.scale() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn scale_stays_clamped_over_arbitrary_zoom_sequences() {
        let mut viewport = ViewportTransform::default();
        for _ in 0..50 {
            viewport.zoom_in();
            assert!(viewport.scale() <= SCALE_MAX);
        }
        assert!((viewport.scale() - SCALE_MAX).abs() < 1e-6);

        for _ in 0..100 {
            viewport.zoom_out();
            assert!(viewport.scale() >= SCALE_MIN);
        }
        assert!((viewport.scale() - SCALE_MIN).abs() < 1e-6);

        // Alternating input never escapes the bounds either.
        for step in 0..40 {
            if step % 3 == 0 {
                viewport.zoom_out();
            } else {
                viewport.zoom_in();
            }
            assert!(viewport.scale() >= SCALE_MIN && viewport.scale() <= SCALE_MAX);
        }
    }

    #[test]
    fn world_screen_round_trip_is_exact_within_epsilon() {
        let mut viewport = ViewportTransform::default();
        viewport.zoom_in();
        viewport.zoom_in();
        viewport.begin_drag(Vec2::new(5.0, 9.0));
        viewport.drag_to(Vec2::new(38.0, -71.5));
        viewport.end_drag();

        for point in [
            Vec2::ZERO,
            Vec2::new(100.0, 50.0),
            Vec2::new(-321.5, 870.25),
            Vec2::new(0.001, -0.001),
        ] {
            let round_trip = viewport.world_to_screen(viewport.screen_to_world(point));
            assert!(
                round_trip.distance(point) < 1e-3,
                "round trip drifted: {point:?} -> {round_trip:?}"
            );
        }
    }

    #[test]
    fn drag_translates_by_cursor_offset_from_anchor() {
        let mut viewport = ViewportTransform::default();
        assert!(viewport.begin_drag(Vec2::new(10.0, 10.0)));
        viewport.drag_to(Vec2::new(25.0, 4.0));
        assert_eq!(viewport.translate(), Vec2::new(15.0, -6.0));
        viewport.end_drag();
        assert!(!viewport.is_dragging());

        // A later drag keeps the accumulated translation as its base.
        assert!(viewport.begin_drag(Vec2::new(0.0, 0.0)));
        viewport.drag_to(Vec2::new(1.0, 1.0));
        assert_eq!(viewport.translate(), Vec2::new(16.0, -5.0));
    }

    #[test]
    fn reentrant_begin_drag_is_rejected() {
        let mut viewport = ViewportTransform::default();
        assert!(viewport.begin_drag(Vec2::new(10.0, 10.0)));
        assert!(!viewport.begin_drag(Vec2::new(999.0, 999.0)));
        viewport.drag_to(Vec2::new(11.0, 10.0));
        // The original anchor stays in effect.
        assert_eq!(viewport.translate(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn drag_to_without_active_drag_is_a_no_op() {
        let mut viewport = ViewportTransform::default();
        viewport.drag_to(Vec2::new(500.0, 500.0));
        assert_eq!(viewport.translate(), Vec2::ZERO);
    }
}
