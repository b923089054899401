//! AirCanvas Motion - On-device inertial gesture estimator for air-drawing
//!
//! The estimator converts a noisy, irregularly-timed stream of 3-axis
//! acceleration samples into a stabilized, drift-suppressed position
//! estimate usable as a drawing cursor, through a deterministic pipeline:
//! low-pass filtering → magnitude gating → motion classification →
//! zero-velocity-aware double integration.
//!
//! ## Modules
//!
//! - **filter / gate / motion / integrator**: the four pipeline stages
//! - **pipeline**: one [`GesturePipeline`] value owning all stage state
//! - **source**: sample ingestion (subscription seam, worker thread)

pub mod config;
pub mod error;
pub mod filter;
pub mod gate;
pub mod integrator;
pub mod motion;
pub mod pipeline;
pub mod source;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::PipelineConfig;
pub use error::MotionError;
pub use pipeline::GesturePipeline;
pub use source::{PipelineWorker, ReplaySource, SampleSource, SharedCursor, Subscription};
pub use types::{CursorUpdate, Diagnostics, MotionState, Sample, SampleRate, Vec3};

/// Library version embedded in diagnostics and CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for diagnostics and CLI output
pub const PRODUCER_NAME: &str = "aircanvas-motion";
