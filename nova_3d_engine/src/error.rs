//! Error types for the Nova3D engine
//!
//! This module defines the error types used throughout the engine:
//! scene hierarchy management, camera/cascade math, configuration,
//! and the threaded engine loop.

use std::fmt;

/// Result type for Nova3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nova3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A NodeKey that does not (or no longer) refers to a live node
    InvalidNode(String),

    /// Hierarchy mutation that would break the tree (self-parenting, cycles)
    HierarchyError(String),

    /// Invalid argument passed to a math or scene operation
    InvalidArgument(String),

    /// EngineOptions failed validation
    InvalidConfig(String),

    /// Initialization failed (engine, threads, subsystems)
    InitializationFailed(String),

    /// Worker thread could not be spawned or panicked
    ThreadError(String),

    /// Failure reported by an external collaborator (render submitter, physics)
    BackendError(String),

    /// Generic invalid operation (produced by `engine_err!`)
    InvalidOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidNode(msg) => write!(f, "Invalid node: {}", msg),
            Error::HierarchyError(msg) => write!(f, "Hierarchy error: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ThreadError(msg) => write!(f, "Thread error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
