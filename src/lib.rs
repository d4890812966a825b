pub mod commands;
pub mod controller;
pub mod protocol;
pub mod registry;
pub mod scales;
pub mod state;
pub mod system;
pub mod timer;
pub mod types;

pub use types::*;
pub use controller::*;
