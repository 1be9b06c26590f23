//! Runtime module
//!
//! The threaded engine loop: configuration, time sources, the component
//! contract and `GameEngine` itself.

mod component;
mod context;
mod game_engine;
mod options;
mod time;

pub use component::{GameComponent, PhysicsSimulation};
pub use context::{EngineContext, EngineHandle};
pub use game_engine::GameEngine;
pub use options::EngineOptions;
pub use time::{Clock, FixedStepAccumulator, FrameStats, ManualClock, SystemClock};
