pub mod collision;
pub mod compute;
pub mod enemies;
pub mod entities;
pub mod projectiles;
pub mod tank;
pub mod terrain;
pub mod tuning;
