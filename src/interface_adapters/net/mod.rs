// Network adapter modules split by websocket sessions vs plain HTTP routes.

pub mod client;
pub mod names;

pub use client::{spawn_world_serializer, ws_handler};
pub use names::check_name_handler;
