use std::collections::HashMap;

use super::*;

// Marker palette from the map page: indigo base, lighter indigo on hover.
fn entity_base_color() -> Color {
    Color::srgb_u8(0x79, 0x86, 0xcb)
}

fn entity_hover_color() -> Color {
    Color::srgb_u8(0x9f, 0xa8, 0xda)
}

#[derive(Clone, Debug, PartialEq)]
pub(super) struct EntityState {
    pub(super) position: Vec2,
    pub(super) base_color: Color,
    pub(super) render_color: Color,
    pub(super) hovered: bool,
    pub(super) selected: bool,
}

impl EntityState {
    fn new(position: Vec2) -> Self {
        let base_color = entity_base_color();
        Self {
            position,
            base_color,
            render_color: base_color,
            hovered: false,
            selected: false,
        }
    }
}

/// Live entity state keyed by id. Positions are written only by inbound
/// `entity-move` messages; hover and selection flags only by the scene's
/// pointer logic. Iteration order carries no meaning.
#[derive(Resource, Default)]
pub(super) struct EntityRegistry {
    entities: HashMap<String, EntityState>,
}

impl EntityRegistry {
    /// Inserts the entity or overwrites its position, preserving any
    /// existing hover/selection state.
    pub(super) fn upsert(&mut self, id: &str, position: Vec2) {
        match self.entities.get_mut(id) {
            Some(entity) => entity.position = position,
            None => {
                self.entities.insert(id.to_string(), EntityState::new(position));
            }
        }
    }

    pub(super) fn get(&self, id: &str) -> Option<&EntityState> {
        self.entities.get(id)
    }

    pub(super) fn all(&self) -> impl Iterator<Item = (&String, &EntityState)> {
        self.entities.iter()
    }

    pub(super) fn ids(&self) -> impl Iterator<Item = &String> {
        self.entities.keys()
    }

    pub(super) fn len(&self) -> usize {
        self.entities.len()
    }

    /// No-op on unknown ids.
    pub(super) fn set_hover(&mut self, id: &str, hovered: bool) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.hovered = hovered;
            entity.render_color = if hovered {
                entity_hover_color()
            } else {
                entity.base_color
            };
        }
    }

    /// No-op on unknown ids.
    pub(super) fn set_selected(&mut self, id: &str, selected: bool) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.selected = selected;
        }
    }

    pub(super) fn clear_selection(&mut self) {
        for entity in self.entities.values_mut() {
            entity.selected = false;
        }
    }

    pub(super) fn selected(&self) -> Option<(&String, &EntityState)> {
        self.entities.iter().find(|(_, entity)| entity.selected)
    }
}
