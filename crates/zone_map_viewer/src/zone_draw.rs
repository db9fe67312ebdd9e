use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(super) enum DrawState {
    #[default]
    Idle,
    Drawing,
    ReadyToCommit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CommitError {
    /// The loop has not been closed yet (or no drawing is active).
    NotReady,
    /// The zone name is empty after trimming.
    EmptyName,
}

impl std::fmt::Display for CommitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitError::NotReady => write!(f, "zone outline is not closed"),
            CommitError::EmptyName => write!(f, "zone name must not be empty"),
        }
    }
}

/// The zone-authoring state machine. At most one in-progress polygon exists
/// process-wide (this is a singleton resource).
///
/// `Idle -> start -> Drawing -> (closure vertex) -> ReadyToCommit`, then
/// `commit` or `cancel` back to `Idle`.
#[derive(Resource, Default)]
pub(super) struct ZoneDrawing {
    state: DrawState,
    vertices: Vec<Vec2>,
    pub(super) name_input: String,
}

impl ZoneDrawing {
    pub(super) fn state(&self) -> DrawState {
        self.state
    }

    pub(super) fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub(super) fn active(&self) -> bool {
        self.state != DrawState::Idle
    }

    /// True while the closure region around the first vertex should be
    /// highlighted: the loop can only close once two vertices are placed.
    pub(super) fn closable(&self) -> bool {
        self.state == DrawState::Drawing && self.vertices.len() >= 2
    }

    pub(super) fn start(&mut self) {
        if self.state != DrawState::Idle {
            return;
        }
        self.vertices.clear();
        self.state = DrawState::Drawing;
    }

    /// Appends a vertex while drawing. A point landing inside the closure
    /// tolerance of the first vertex closes the loop instead, provided at
    /// least two vertices were already placed: a click back on the start
    /// point must not produce a degenerate zero-area zone.
    pub(super) fn add_vertex(&mut self, point: Vec2) {
        if self.state != DrawState::Drawing {
            return;
        }
        if self.vertices.len() >= 2
            && point_in_circle(point, self.vertices[0], ZONE_CLOSE_TOLERANCE_PX)
        {
            self.vertices.push(self.vertices[0]);
            self.state = DrawState::ReadyToCommit;
        } else {
            self.vertices.push(point);
        }
    }

    pub(super) fn can_commit(&self) -> bool {
        self.state == DrawState::ReadyToCommit && !self.name_input.trim().is_empty()
    }

    /// Consumes the closed outline into a committed [`Zone`], resetting to
    /// `Idle`. Rejection leaves all state untouched.
    pub(super) fn commit(&mut self) -> Result<Zone, CommitError> {
        if self.state != DrawState::ReadyToCommit {
            return Err(CommitError::NotReady);
        }
        let name = self.name_input.trim();
        if name.is_empty() {
            return Err(CommitError::EmptyName);
        }

        let zone = Zone::new(name.to_string(), std::mem::take(&mut self.vertices));
        self.state = DrawState::Idle;
        self.name_input.clear();
        Ok(zone)
    }

    /// Discards the in-progress outline from any non-idle state.
    pub(super) fn cancel(&mut self) {
        self.state = DrawState::Idle;
        self.vertices.clear();
        self.name_input.clear();
    }
}

/// Routes map clicks into the state machine while a drawing is active.
pub(super) fn handle_vertex_placement(
    buttons: Res<ButtonInput<MouseButton>>,
    pointer: Res<PointerState>,
    mut drawing: ResMut<ZoneDrawing>,
) {
    if drawing.state() != DrawState::Drawing || pointer.over_ui {
        return;
    }
    let Some(world) = pointer.world else {
        return;
    };
    if buttons.just_pressed(MouseButton::Left) {
        drawing.add_vertex(world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawing_with_open_triangle() -> ZoneDrawing {
        let mut drawing = ZoneDrawing::default();
        drawing.start();
        drawing.add_vertex(Vec2::new(10.0, 10.0));
        drawing.add_vertex(Vec2::new(50.0, 10.0));
        drawing.add_vertex(Vec2::new(50.0, 50.0));
        drawing
    }

    #[test]
    fn start_enters_drawing_with_empty_outline() {
        let mut drawing = ZoneDrawing::default();
        drawing.start();
        assert_eq!(drawing.state(), DrawState::Drawing);
        assert!(drawing.vertices().is_empty());
    }

    #[test]
    fn vertex_near_start_closes_the_loop() {
        let mut drawing = drawing_with_open_triangle();
        // distance({12,11},{10,10}) ~ 2.24, inside the closure tolerance
        drawing.add_vertex(Vec2::new(12.0, 11.0));
        assert_eq!(drawing.state(), DrawState::ReadyToCommit);
        assert_eq!(
            drawing.vertices(),
            &[
                Vec2::new(10.0, 10.0),
                Vec2::new(50.0, 10.0),
                Vec2::new(50.0, 50.0),
                Vec2::new(10.0, 10.0),
            ]
        );
    }

    #[test]
    fn second_click_on_start_point_does_not_close() {
        let mut drawing = ZoneDrawing::default();
        drawing.start();
        drawing.add_vertex(Vec2::new(10.0, 10.0));
        drawing.add_vertex(Vec2::new(11.0, 10.0));
        assert_eq!(drawing.state(), DrawState::Drawing);
        assert_eq!(drawing.vertices().len(), 2);
    }

    #[test]
    fn vertices_after_closure_are_ignored() {
        let mut drawing = drawing_with_open_triangle();
        drawing.add_vertex(Vec2::new(10.0, 10.0));
        assert_eq!(drawing.state(), DrawState::ReadyToCommit);
        drawing.add_vertex(Vec2::new(500.0, 500.0));
        assert_eq!(drawing.vertices().len(), 4);
    }

    #[test]
    fn commit_requires_closed_loop() {
        let mut drawing = drawing_with_open_triangle();
        drawing.name_input = "Room1".to_string();
        assert_eq!(drawing.commit(), Err(CommitError::NotReady));
        assert_eq!(drawing.state(), DrawState::Drawing);
    }

    #[test]
    fn commit_with_blank_name_is_rejected_without_state_change() {
        let mut drawing = drawing_with_open_triangle();
        drawing.add_vertex(Vec2::new(10.0, 10.0));
        drawing.name_input = "   ".to_string();
        assert_eq!(drawing.commit(), Err(CommitError::EmptyName));
        assert_eq!(drawing.state(), DrawState::ReadyToCommit);
        assert_eq!(drawing.vertices().len(), 4);
    }

    #[test]
    fn commit_trims_name_and_resets_to_idle() {
        let mut drawing = drawing_with_open_triangle();
        drawing.add_vertex(Vec2::new(10.0, 10.0));
        drawing.name_input = "  Room1  ".to_string();
        let zone = drawing.commit().expect("commit");
        assert_eq!(zone.id, "Room1");
        assert_eq!(zone.vertices.len(), 4);
        assert_eq!(drawing.state(), DrawState::Idle);
        assert!(drawing.vertices().is_empty());
        assert!(drawing.name_input.is_empty());
    }

    #[test]
    fn cancel_resets_from_any_non_idle_state() {
        let mut drawing = drawing_with_open_triangle();
        drawing.cancel();
        assert_eq!(drawing.state(), DrawState::Idle);
        assert!(drawing.vertices().is_empty());

        let mut drawing = drawing_with_open_triangle();
        drawing.add_vertex(Vec2::new(10.0, 10.0));
        assert_eq!(drawing.state(), DrawState::ReadyToCommit);
        drawing.cancel();
        assert_eq!(drawing.state(), DrawState::Idle);
        assert!(drawing.vertices().is_empty());
    }

    #[test]
    fn start_while_active_is_ignored() {
        let mut drawing = drawing_with_open_triangle();
        drawing.start();
        assert_eq!(drawing.vertices().len(), 3);
        assert_eq!(drawing.state(), DrawState::Drawing);
    }

    #[test]
    fn closure_highlight_needs_two_vertices() {
        let mut drawing = ZoneDrawing::default();
        assert!(!drawing.closable());
        drawing.start();
        drawing.add_vertex(Vec2::new(0.0, 0.0));
        assert!(!drawing.closable());
        drawing.add_vertex(Vec2::new(100.0, 0.0));
        assert!(drawing.closable());
        drawing.add_vertex(Vec2::new(100.0, 100.0));
        drawing.add_vertex(Vec2::new(0.0, 1.0));
        assert!(!drawing.closable());
    }
}
