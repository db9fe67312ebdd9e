use std::collections::HashMap;

use super::*;

pub(super) const CAMERA_Z: f32 = 0.0;
const Z_MAP: f32 = 0.0;
const Z_MARKER: f32 = 2.0;

// Dash geometry from the authoring page: 10 px dashes with 10 px gaps.
const DASH_LENGTH_PX: f32 = 10.0;
const DASH_GAP_PX: f32 = 10.0;

#[derive(Component)]
pub(super) struct MapCamera;

#[derive(Component)]
pub(super) struct MapBackground;

#[derive(Component)]
pub(super) struct EntityMarker {
    pub(super) id: String,
}

#[derive(Resource, Default)]
pub(super) struct SceneState {
    marker_entities: HashMap<String, Entity>,
}

#[derive(Resource)]
pub(super) struct MapAssets {
    marker_mesh: Handle<Mesh>,
    base_material: Handle<ColorMaterial>,
    hover_material: Handle<ColorMaterial>,
    selected_material: Handle<ColorMaterial>,
}

/// Map-pixel world coordinates grow downward; bevy's render y grows upward.
pub(super) fn render_pos(world: Vec2) -> Vec2 {
    Vec2::new(world.x, -world.y)
}

pub(super) fn hit_entity_at(registry: &EntityRegistry, world: Vec2) -> Option<String> {
    registry
        .all()
        .find(|(_, entity)| point_in_circle(world, entity.position, ENTITY_HOVER_RADIUS_PX))
        .map(|(id, _)| id.clone())
}

pub(super) fn setup_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    calibration: Res<MapCalibration>,
) {
    commands.spawn((Camera2d, MapCamera));

    // The background bitmap spans world pixels [0, w] x [0, h]; it is loaded
    // once and only ever re-transformed by the camera.
    let map_size = Vec2::new(calibration.canvas_width_px, calibration.canvas_height_px);
    commands.spawn((
        Sprite {
            image: asset_server.load("map.png"),
            custom_size: Some(map_size),
            ..default()
        },
        Transform::from_translation(Vec3::new(map_size.x / 2.0, -map_size.y / 2.0, Z_MAP)),
        MapBackground,
    ));

    commands.insert_resource(MapAssets {
        marker_mesh: meshes.add(Circle::new(ENTITY_HOVER_RADIUS_PX)),
        base_material: materials.add(ColorMaterial::from_color(Color::srgb_u8(0x79, 0x86, 0xcb))),
        hover_material: materials.add(ColorMaterial::from_color(Color::srgb_u8(0x9f, 0xa8, 0xda))),
        selected_material: materials
            .add(ColorMaterial::from_color(Color::srgb_u8(0xc5, 0xca, 0xe9))),
    });
}

/// Keeps one marker entity per registry id: spawns newly seen ids, then
/// refreshes position, hover state, and material every frame.
pub(super) fn update_entity_markers(
    mut commands: Commands,
    mut registry: ResMut<EntityRegistry>,
    pointer: Res<PointerState>,
    drawing: Res<ZoneDrawing>,
    assets: Res<MapAssets>,
    mut scene: ResMut<SceneState>,
    mut markers: Query<(
        &EntityMarker,
        &mut Transform,
        &mut MeshMaterial2d<ColorMaterial>,
    )>,
) {
    let hover_point = if drawing.active() || pointer.over_ui {
        None
    } else {
        pointer.world
    };
    let hover_updates: Vec<(String, bool)> = registry
        .all()
        .map(|(id, entity)| {
            let hovered = hover_point
                .map(|point| point_in_circle(point, entity.position, ENTITY_HOVER_RADIUS_PX))
                .unwrap_or(false);
            (id.clone(), hovered)
        })
        .collect();
    for (id, hovered) in hover_updates {
        registry.set_hover(&id, hovered);
    }

    let missing: Vec<String> = registry
        .ids()
        .filter(|id| !scene.marker_entities.contains_key(*id))
        .cloned()
        .collect();
    for id in missing {
        let Some(state) = registry.get(&id) else {
            continue;
        };
        let marker = commands
            .spawn((
                Mesh2d(assets.marker_mesh.clone()),
                MeshMaterial2d(assets.base_material.clone()),
                Transform::from_translation(marker_translation(state.position)),
                EntityMarker { id: id.clone() },
            ))
            .with_children(|parent| {
                parent.spawn((
                    Text2d::new(id.clone()),
                    TextFont {
                        font_size: LABEL_FONT_SIZE,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    Transform::from_translation(Vec3::new(
                        0.0,
                        -(ENTITY_HOVER_RADIUS_PX + LABEL_OFFSET_PX),
                        1.0,
                    )),
                ));
            })
            .id();
        scene.marker_entities.insert(id, marker);
    }

    for (marker, mut transform, mut material) in markers.iter_mut() {
        let Some(state) = registry.get(&marker.id) else {
            continue;
        };
        transform.translation = marker_translation(state.position);
        let target = if state.selected {
            &assets.selected_material
        } else if state.hovered {
            &assets.hover_material
        } else {
            &assets.base_material
        };
        if material.0 != *target {
            material.0 = target.clone();
        }
    }
}

fn marker_translation(world: Vec2) -> Vec3 {
    render_pos(world).extend(Z_MARKER)
}

/// Click selection: an entity under the cursor becomes the single selected
/// entity; a click on empty map clears the selection.
pub(super) fn handle_entity_selection(
    buttons: Res<ButtonInput<MouseButton>>,
    pointer: Res<PointerState>,
    drawing: Res<ZoneDrawing>,
    mut registry: ResMut<EntityRegistry>,
) {
    if drawing.active() || pointer.over_ui || !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(world) = pointer.world else {
        return;
    };
    let hit = hit_entity_at(&registry, world);
    registry.clear_selection();
    if let Some(id) = hit {
        registry.set_selected(&id, true);
    }
}

/// Outlines every marker in the registry's current render color, so hover
/// and selection read even when the fill is hard to distinguish.
pub(super) fn draw_entity_rings(mut gizmos: Gizmos, registry: Res<EntityRegistry>) {
    for (_, entity) in registry.all() {
        gizmos.circle_2d(
            Isometry2d::from_translation(render_pos(entity.position)),
            ENTITY_HOVER_RADIUS_PX,
            entity.render_color,
        );
    }
}

/// Draws committed zones as solid closed polylines and the in-progress
/// outline as dashed segments with a live segment to the pointer, plus the
/// closure ring once the loop can close.
pub(super) fn draw_zone_overlays(
    mut gizmos: Gizmos,
    zones: Res<ZoneStore>,
    drawing: Res<ZoneDrawing>,
    pointer: Res<PointerState>,
) {
    let committed_color = Color::WHITE;
    let draft_color = Color::srgb(0.9, 0.9, 0.9);
    let ring_color = Color::srgb(1.0, 1.0, 0.0);

    for zone in zones.all() {
        if zone.vertices.len() >= 2 {
            gizmos.linestrip_2d(
                zone.vertices.iter().map(|vertex| render_pos(*vertex)),
                committed_color,
            );
        }
    }

    if !drawing.active() {
        return;
    }
    let vertices = drawing.vertices();
    for pair in vertices.windows(2) {
        draw_dashed_line(&mut gizmos, render_pos(pair[0]), render_pos(pair[1]), draft_color);
    }
    if drawing.state() == DrawState::Drawing {
        if let (Some(last), Some(world)) = (vertices.last(), pointer.world) {
            draw_dashed_line(&mut gizmos, render_pos(*last), render_pos(world), draft_color);
        }
        if drawing.closable() {
            gizmos.circle_2d(
                Isometry2d::from_translation(render_pos(vertices[0])),
                ZONE_CLOSE_TOLERANCE_PX,
                ring_color,
            );
        }
    }
}

fn draw_dashed_line(gizmos: &mut Gizmos, start: Vec2, end: Vec2, color: Color) {
    for (dash_start, dash_end) in dash_segments(start, end, DASH_LENGTH_PX, DASH_GAP_PX) {
        gizmos.line_2d(dash_start, dash_end, color);
    }
}

fn dash_segments(start: Vec2, end: Vec2, dash: f32, gap: f32) -> Vec<(Vec2, Vec2)> {
    let direction = end - start;
    let length = direction.length();
    if length < 1e-3 {
        return Vec::new();
    }
    let direction = direction / length;

    let mut segments = Vec::new();
    let mut cursor = 0.0;
    while cursor < length {
        let dash_end = (cursor + dash).min(length);
        segments.push((start + direction * cursor, start + direction * dash_end));
        cursor += dash + gap;
    }
    segments
}
