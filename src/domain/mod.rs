pub mod ai;
pub mod entity;
pub mod maze;
pub mod movement;
pub mod rules;
pub mod tile;
