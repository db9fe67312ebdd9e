use std::collections::HashMap;

use zone_map_proto::WorldPoint;

use super::*;

/// A committed, closed polygon. Immutable once stored; a re-announce under
/// the same id replaces the whole value.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct Zone {
    pub(super) id: String,
    pub(super) vertices: Vec<Vec2>,
}

impl Zone {
    pub(super) fn new(id: String, vertices: Vec<Vec2>) -> Self {
        Self { id, vertices }
    }

    pub(super) fn from_wire(zone_id: String, vertices: Vec<WorldPoint>) -> Self {
        Self::new(
            zone_id,
            vertices
                .into_iter()
                .map(|point| Vec2::new(point.x as f32, point.y as f32))
                .collect(),
        )
    }

    pub(super) fn wire_positions(&self) -> Vec<WorldPoint> {
        self.vertices
            .iter()
            .map(|vertex| WorldPoint::new(vertex.x as f64, vertex.y as f64))
            .collect()
    }
}

/// Committed zones keyed by id: locally authored commits plus remote
/// `zone-announce` messages. Iteration order carries no meaning.
#[derive(Resource, Default)]
pub(super) struct ZoneStore {
    zones: HashMap<String, Zone>,
}

impl ZoneStore {
    pub(super) fn insert(&mut self, zone: Zone) {
        self.zones.insert(zone.id.clone(), zone);
    }

    pub(super) fn get(&self, id: &str) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub(super) fn all(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// First zone whose outline contains the point. Overlapping zones have
    /// no defined priority.
    pub(super) fn zone_at(&self, point: Vec2) -> Option<&Zone> {
        self.zones
            .values()
            .find(|zone| point_in_closed_path(point, &zone.vertices))
    }

    pub(super) fn len(&self) -> usize {
        self.zones.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_zone_with_same_id() {
        let mut store = ZoneStore::default();
        store.insert(Zone::new(
            "Room1".to_string(),
            vec![Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ZERO],
        ));
        store.insert(Zone::new(
            "Room1".to_string(),
            vec![Vec2::ZERO, Vec2::ONE, Vec2::Y, Vec2::ZERO],
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("Room1").expect("zone").vertices[1],
            Vec2::ONE
        );
    }

    #[test]
    fn zone_at_reports_the_containing_zone() {
        let mut store = ZoneStore::default();
        store.insert(Zone::new(
            "Room1".to_string(),
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(100.0, 0.0),
                Vec2::new(100.0, 100.0),
                Vec2::new(0.0, 100.0),
                Vec2::new(0.0, 0.0),
            ],
        ));
        assert_eq!(
            store.zone_at(Vec2::new(50.0, 50.0)).map(|zone| zone.id.as_str()),
            Some("Room1")
        );
        assert!(store.zone_at(Vec2::new(150.0, 50.0)).is_none());
    }

    #[test]
    fn wire_round_trip_preserves_vertex_order() {
        let zone = Zone::from_wire(
            "Room1".to_string(),
            vec![
                WorldPoint::new(10.0, 10.0),
                WorldPoint::new(50.0, 10.0),
                WorldPoint::new(10.0, 10.0),
            ],
        );
        assert_eq!(zone.vertices[1], Vec2::new(50.0, 10.0));
        let positions = zone.wire_positions();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0], WorldPoint::new(10.0, 10.0));
        assert_eq!(positions[1], WorldPoint::new(50.0, 10.0));
    }
}
