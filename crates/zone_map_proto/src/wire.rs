use serde::{Deserialize, Serialize};

pub const MAP_PROTOCOL_VERSION: u32 = 1;

/// A point in map (world-pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Messages delivered by the transport collaborator to the viewer.
///
/// Wire framing is one JSON object per line; the `type` tag and camelCase
/// field names match what the collaborator emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MapServerMessage {
    #[serde(rename_all = "camelCase")]
    EntityMove { id: String, x: f64, y: f64 },
    #[serde(rename_all = "camelCase")]
    ZoneAnnounce {
        zone_id: String,
        vertices: Vec<WorldPoint>,
    },
}

/// Messages the viewer sends to the transport collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MapClientMessage {
    /// World-to-pixel calibration, sent once when the connection opens.
    #[serde(rename_all = "camelCase")]
    Init {
        canvas_width: f64,
        canvas_height: f64,
        world_width: f64,
        world_height: f64,
    },
    /// A freshly committed zone, emitted once per successful commit.
    #[serde(rename_all = "camelCase")]
    ZoneCreate {
        room_id: String,
        positions: Vec<WorldPoint>,
    },
}
