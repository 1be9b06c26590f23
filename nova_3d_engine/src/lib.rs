/*!
# Nova 3D Engine

Simulation core of the Nova 3D engine: scene graph, cameras and the
threaded engine loop. GPU work stays behind the `RenderSubmitter` trait.

## Architecture

- **Scene**: node arena with capability tags, hierarchy, lazily
  resolved world transforms and lights; `SceneManager` for named scenes
- **Camera**: projection parameters, frustum extraction and culling,
  cascaded shadow splits
- **Render**: per-frame `RenderState` snapshots published through a
  lock-free-indexed ring of buffers
- **Runtime**: `GameEngine` running the physics, game and render loops

Everything is reached through the `nova3d` namespace.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod scene;
pub mod camera;
pub mod render;
pub mod runtime;

// Main nova3d namespace module
pub mod nova3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Global services (logging)
    pub use crate::engine::Engine;

    // Engine loop entry point
    pub use crate::runtime::{EngineOptions, GameComponent, GameEngine};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod render {
        pub use crate::render::*;
    }

    pub mod runtime {
        pub use crate::runtime::*;
    }
}

// Re-export math library at crate root
pub use glam;
