use crate::use_cases::WorldHandle;

#[derive(Clone)]
pub struct AppState {
    // Channels into and out of the single authoritative world.
    pub world: WorldHandle,
}
