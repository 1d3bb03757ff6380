pub mod event;
pub mod intent;
pub mod step;
pub mod world;
