// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

// MVC Architecture, with the scene's collaborators behind traits in `world`
pub mod model;
pub mod controller;
pub mod world;

pub use config::{ConfigError, RigConfig};
pub use controller::{FrameClock, FrameTime, Rig};
pub use error::{Rejection, RigError};
