use std::sync::mpsc::Sender;

use bevy_egui::{egui, EguiContexts};
use zone_map_proto::MapClientMessage;

use super::*;

pub(super) fn render_side_panel(
    mut contexts: EguiContexts,
    state: Option<Res<TransportState>>,
    mut viewport: ResMut<ViewportTransform>,
    mut drawing: ResMut<ZoneDrawing>,
    mut zones: ResMut<ZoneStore>,
    registry: Res<EntityRegistry>,
    pointer: Res<PointerState>,
    calibration: Res<MapCalibration>,
    client: Option<Res<TransportClient>>,
) {
    let Ok(context) = contexts.ctx_mut() else {
        return;
    };

    egui::SidePanel::right("zone-map-side-panel")
        .resizable(false)
        .default_width(UI_PANEL_WIDTH)
        .show(context, |ui| {
            ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

            ui.heading("Zone Map");
            if let Some(state) = state.as_deref() {
                ui.add(egui::Label::new(status_line(&state.status)).selectable(true));
            }
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("+").clicked() {
                    viewport.zoom_in();
                }
                if ui.button("-").clicked() {
                    viewport.zoom_out();
                }
                ui.label(format!("zoom {:.2}", viewport.scale()));
            });
            ui.label(format!(
                "pan x {:.0}, y {:.0}",
                viewport.translate().x,
                viewport.translate().y
            ));
            ui.label(pointer_line(pointer.world));
            if let Some(zone) = pointer.world.and_then(|world| zones.zone_at(world)) {
                ui.label(format!("In zone: {}", zone.id));
            }
            ui.label(format!("{} entities tracked", registry.len()));
            ui.separator();

            ui.heading(format!("Zones ({})", zones.len()));
            if !drawing.active() {
                if ui.button("Create new zone").clicked() {
                    drawing.start();
                }
            } else {
                ui.label(drawing_hint(&drawing));
                ui.text_edit_singleline(&mut drawing.name_input);
                ui.horizontal(|ui| {
                    let can_save = drawing.can_commit();
                    if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
                        let tx = client.as_deref().map(|client| &client.tx);
                        match commit_zone(&mut drawing, &mut zones, tx) {
                            Ok(zone) => info!("zone committed: {}", zone.id),
                            Err(err) => warn!("zone commit rejected: {err}"),
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        drawing.cancel();
                    }
                });
            }

            let mut committed: Vec<String> = zones
                .all()
                .map(|zone| format!("{} ({} vertices)", zone.id, zone.vertices.len()))
                .collect();
            committed.sort();
            for line in committed {
                ui.label(line);
            }
            ui.separator();

            if let Some((id, entity)) = registry.selected() {
                ui.heading("Selection");
                for line in selection_lines(id, entity, &calibration, &viewport) {
                    ui.label(line);
                }
            }
        });
}

/// Commits the closed outline: stores the zone locally and broadcasts it as
/// `zone-create`. Validation failures change nothing.
pub(super) fn commit_zone(
    drawing: &mut ZoneDrawing,
    zones: &mut ZoneStore,
    tx: Option<&Sender<MapClientMessage>>,
) -> Result<Zone, CommitError> {
    let zone = drawing.commit()?;
    if let Some(tx) = tx {
        let _ = tx.send(MapClientMessage::ZoneCreate {
            room_id: zone.id.clone(),
            positions: zone.wire_positions(),
        });
    }
    zones.insert(zone.clone());
    Ok(zone)
}

fn status_line(status: &ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Connecting => "Status: connecting...".to_string(),
        ConnectionStatus::Connected => "Status: connected".to_string(),
        ConnectionStatus::Error(message) => format!("Status: error: {message}"),
    }
}

fn pointer_line(world: Option<Vec2>) -> String {
    match world {
        Some(world) => format!("Pointer: x {:.0} px, y {:.0} px", world.x, world.y),
        None => "Pointer: (outside map)".to_string(),
    }
}

fn drawing_hint(drawing: &ZoneDrawing) -> &'static str {
    match drawing.state() {
        DrawState::ReadyToCommit => "Loop closed. Name the zone and save.",
        DrawState::Drawing if drawing.closable() => {
            "Click near the first vertex to close the loop."
        }
        _ => "Click the map to place vertices.",
    }
}

fn selection_lines(
    id: &str,
    entity: &EntityState,
    calibration: &MapCalibration,
    viewport: &ViewportTransform,
) -> Vec<String> {
    let meters = calibration.world_to_meters(entity.position);
    let screen = viewport.world_to_screen(entity.position);
    vec![
        format!("ID: {id}"),
        format!(
            "world: x {:.0} px, y {:.0} px",
            entity.position.x, entity.position.y
        ),
        format!("meters: x {:.2} m, y {:.2} m", meters.x, meters.y),
        format!("screen: x {:.0} px, y {:.0} px", screen.x, screen.y),
    ]
}
