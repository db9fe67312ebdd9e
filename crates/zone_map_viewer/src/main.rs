use bevy::prelude::*;
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};

mod camera_controls;
mod connection;
mod registry;
mod scene;
mod ui;
mod viewport;
mod zone_draw;
mod zones;

use camera_controls::*;
use connection::*;
use hit_test::*;
use registry::*;
use scene::*;
use ui::*;
use viewport::*;
use zone_draw::*;
use zones::*;

const DEFAULT_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_MAP_WIDTH_PX: f32 = 900.0;
const DEFAULT_MAP_HEIGHT_PX: f32 = 900.0;
const DEFAULT_WORLD_WIDTH_M: f32 = 45.0;
const DEFAULT_WORLD_HEIGHT_M: f32 = 45.0;

const SCALE_MIN: f32 = 0.33;
const SCALE_MAX: f32 = 1.95;
const SCALE_STEP: f32 = 0.8;

const ENTITY_HOVER_RADIUS_PX: f32 = 24.0;
// Closure tolerance is configured on its own; it must not track the entity
// hover radius.
const ZONE_CLOSE_TOLERANCE_PX: f32 = 10.0;

const LABEL_FONT_SIZE: f32 = 14.0;
const LABEL_OFFSET_PX: f32 = 20.0;
const UI_PANEL_WIDTH: f32 = 320.0;

fn main() {
    let addr = resolve_addr();
    let offline = resolve_offline();
    run_ui(addr, offline);
}

fn run_ui(addr: String, offline: bool) {
    App::new()
        .insert_resource(ViewerConfig { addr })
        .insert_resource(OfflineConfig { offline })
        .insert_resource(MapCalibration::from_env())
        .insert_resource(ViewportTransform::default())
        .insert_resource(EntityRegistry::default())
        .insert_resource(ZoneDrawing::default())
        .insert_resource(ZoneStore::default())
        .insert_resource(SceneState::default())
        .insert_resource(PointerState::default())
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Zone Map Viewer".to_string(),
                resolution: (1200, 800).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin::default())
        .add_systems(Startup, (setup_startup_state, setup_scene))
        .add_systems(
            Update,
            (
                poll_transport_messages,
                update_pointer_state,
                handle_wheel_zoom,
                handle_entity_selection,
                handle_map_drag,
                handle_vertex_placement,
                sync_viewport_to_camera,
                update_entity_markers,
                draw_entity_rings,
                draw_zone_overlays,
            )
                .chain(),
        )
        .add_systems(EguiPrimaryContextPass, render_side_panel)
        .run();
}

#[derive(Resource)]
struct ViewerConfig {
    addr: String,
}

#[derive(Resource, Default)]
struct OfflineConfig {
    offline: bool,
}

/// World-to-pixel calibration: the map bitmap extent in pixels and the
/// physical extent it covers in meters. Broadcast to the collaborator in the
/// `init` message and used for the meter readout in the selection panel.
#[derive(Resource, Clone, Copy, Debug)]
struct MapCalibration {
    canvas_width_px: f32,
    canvas_height_px: f32,
    world_width_m: f32,
    world_height_m: f32,
}

impl Default for MapCalibration {
    fn default() -> Self {
        Self {
            canvas_width_px: DEFAULT_MAP_WIDTH_PX,
            canvas_height_px: DEFAULT_MAP_HEIGHT_PX,
            world_width_m: DEFAULT_WORLD_WIDTH_M,
            world_height_m: DEFAULT_WORLD_HEIGHT_M,
        }
    }
}

impl MapCalibration {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            canvas_width_px: env_f32("ZONE_MAP_MAP_WIDTH_PX", defaults.canvas_width_px),
            canvas_height_px: env_f32("ZONE_MAP_MAP_HEIGHT_PX", defaults.canvas_height_px),
            world_width_m: env_f32("ZONE_MAP_WORLD_WIDTH_M", defaults.world_width_m),
            world_height_m: env_f32("ZONE_MAP_WORLD_HEIGHT_M", defaults.world_height_m),
        }
    }

    fn meters_per_pixel(&self) -> Vec2 {
        Vec2::new(
            self.world_width_m / self.canvas_width_px.max(f32::EPSILON),
            self.world_height_m / self.canvas_height_px.max(f32::EPSILON),
        )
    }

    /// Converts a world-pixel position to meters from the map origin.
    fn world_to_meters(&self, world: Vec2) -> Vec2 {
        world * self.meters_per_pixel()
    }

    fn init_message(&self) -> zone_map_proto::MapClientMessage {
        zone_map_proto::MapClientMessage::Init {
            canvas_width: self.canvas_width_px as f64,
            canvas_height: self.canvas_height_px as f64,
            world_width: self.world_width_m as f64,
            world_height: self.world_height_m as f64,
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<f32>().ok())
        .unwrap_or(default)
}

fn resolve_addr() -> String {
    std::env::var("ZONE_MAP_VIEWER_ADDR")
        .ok()
        .or_else(|| std::env::args().nth(1))
        .unwrap_or_else(|| DEFAULT_ADDR.to_string())
}

fn resolve_offline() -> bool {
    std::env::var("ZONE_MAP_VIEWER_OFFLINE").is_ok()
}
