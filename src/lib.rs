//! # Kairos - Charge-Window Controller for Connected EVs
//!
//! A closed-loop controller that keeps an electric vehicle's charging session
//! on schedule: given a desired completion-time window and a target
//! battery-level range, it periodically reads charging telemetry and adjusts
//! the available actuators (AC current limit, cabin preconditioning, target
//! SoC) so the predicted completion time stays inside the window.
//!
//! ## Architecture
//!
//! The application follows a modular architecture with clear separation of
//! concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `soc`: Target state-of-charge quantization on the 5% grid
//! - `vehicle`: Telemetry/control port traits and the telemetry data model
//! - `api`: HTTP implementation of the ports (feature `api`)
//! - `session`: Charge-window session state
//! - `controller`: The priority-ordered multi-actuator decision engine
//! - `scheduler`: Fixed-interval, non-overlapping tick scheduling
//! - `driver`: Bootstrap and the long-running control loop

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod session;
pub mod soc;
pub mod vehicle;

// Re-export commonly used types
pub use config::Config;
pub use controller::{ChargeWindowController, ControlAction, NoOpReason};
pub use driver::ChargeDriver;
pub use error::{KairosError, Result};
