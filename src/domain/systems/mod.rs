// Per-tick simulation systems, one per mechanic.

pub mod bouncy;
pub mod gravity;
pub mod lifecycle;
pub mod mimic;
pub mod movement;
pub mod projectiles;
