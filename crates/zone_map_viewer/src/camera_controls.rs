use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use super::*;

/// Cursor state sampled once per frame: raw screen position, the mapped
/// world (map-pixel) position, and whether egui owns the pointer.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub(super) struct PointerState {
    pub(super) screen: Option<Vec2>,
    pub(super) world: Option<Vec2>,
    pub(super) over_ui: bool,
}

pub(super) fn update_pointer_state(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut egui_contexts: EguiContexts,
    viewport: Res<ViewportTransform>,
    mut pointer: ResMut<PointerState>,
) {
    let screen = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position());
    pointer.over_ui = egui_contexts
        .ctx_mut()
        .ok()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);
    pointer.screen = screen;
    pointer.world = screen.map(|point| viewport.screen_to_world(point));
}

pub(super) fn handle_wheel_zoom(
    mut mouse_wheel: MessageReader<MouseWheel>,
    pointer: Res<PointerState>,
    mut viewport: ResMut<ViewportTransform>,
) {
    let mut scroll = 0.0;
    for event in mouse_wheel.read() {
        if !pointer.over_ui {
            scroll += normalized_mouse_wheel_delta(event.unit, event.y);
        }
    }
    if scroll > 0.0 {
        viewport.zoom_in();
    } else if scroll < 0.0 {
        viewport.zoom_out();
    }
}

fn normalized_mouse_wheel_delta(unit: MouseScrollUnit, y: f32) -> f32 {
    match unit {
        MouseScrollUnit::Line => y,
        MouseScrollUnit::Pixel => y / MouseScrollUnit::SCROLL_UNIT_CONVERSION_FACTOR,
    }
}

/// Drag-pan with the left button. Dragging is modal: it never starts while
/// zone drawing is active, while the pointer is over the panel, or on top of
/// an entity marker (that click is a selection), and it always ends when the
/// button lifts or the cursor leaves the window.
pub(super) fn handle_map_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    pointer: Res<PointerState>,
    drawing: Res<ZoneDrawing>,
    registry: Res<EntityRegistry>,
    mut viewport: ResMut<ViewportTransform>,
) {
    if drawing.active() {
        viewport.end_drag();
        return;
    }
    let Some(screen) = pointer.screen else {
        viewport.end_drag();
        return;
    };

    if buttons.just_pressed(MouseButton::Left) && !pointer.over_ui {
        let over_entity = pointer
            .world
            .map(|world| hit_entity_at(&registry, world).is_some())
            .unwrap_or(false);
        if !over_entity {
            viewport.begin_drag(screen);
        }
    }

    if viewport.is_dragging() {
        if buttons.pressed(MouseButton::Left) {
            viewport.drag_to(screen);
        } else {
            viewport.end_drag();
        }
    }
}

/// Drives the bevy camera from the viewport state: the camera looks at the
/// world point currently mapped to the screen center, and the orthographic
/// scale is the inverse of the viewport scale.
pub(super) fn sync_viewport_to_camera(
    viewport: Res<ViewportTransform>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut query: Query<(&mut Transform, &mut Projection), With<MapCamera>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((mut transform, mut projection)) = query.single_mut() else {
        return;
    };
    let window_size = Vec2::new(window.width(), window.height());
    transform.translation = camera_center(&viewport, window_size);
    if let Projection::Orthographic(ortho) = projection.into_inner() {
        ortho.scale = 1.0 / viewport.scale();
    }
}

pub(super) fn camera_center(viewport: &ViewportTransform, window_size: Vec2) -> Vec3 {
    let world_center = viewport.screen_to_world(window_size / 2.0);
    render_pos(world_center).extend(CAMERA_Z)
}
