pub mod wire;

pub use wire::{
    MapClientMessage, MapServerMessage, WorldPoint, MAP_PROTOCOL_VERSION,
};
