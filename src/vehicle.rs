//! Vehicle telemetry and control ports
//!
//! This module defines the read and write interfaces the controller uses to
//! talk to a connected vehicle, plus the wire-independent data model those
//! interfaces exchange. Concrete transport implementations live in `api`.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Charging state reported by the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargingStatus {
    NotCharging,
    Charging,
    Complete,
    Error,
    #[serde(other)]
    Unknown,
}

/// Cabin climate activity reported by the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClimateActivity {
    Off,
    Cooling,
    Heating,
    Ventilation,
    #[serde(other)]
    Unknown,
}

/// Acknowledgement state returned by remote control calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AckState {
    Accepted,
    Pending,
    Failed,
    #[serde(other)]
    Error,
}

impl AckState {
    /// Whether the vehicle took (or queued) the request. The controller never
    /// polls for confirmation, so PENDING counts as success.
    pub fn is_success(self) -> bool {
        matches!(self, AckState::Accepted | AckState::Pending)
    }
}

impl std::fmt::Display for AckState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AckState::Accepted => "ACCEPTED",
            AckState::Pending => "PENDING",
            AckState::Failed => "FAILED",
            AckState::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One telemetry reading, fetched fresh each tick and discarded after use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Battery level, 0..=100 percent
    pub remaining_battery_percent: u8,

    /// Current charging state
    pub charging_status: ChargingStatus,

    /// Predicted completion time; meaningful only while charging
    pub estimated_completion_time: Option<DateTime<Utc>>,

    /// Cabin climate activity
    pub climate_activity: ClimateActivity,
}

/// Charging capabilities reported by the vehicle, fetched once at bootstrap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingProfile {
    /// Supported AC current limits in amperes, ascending
    pub ac_available_limits: Vec<u16>,

    /// Currently configured AC current limit, if known
    pub ac_current_limit: Option<u16>,
}

/// Read interface: current charging telemetry
#[async_trait::async_trait]
pub trait VehicleTelemetry: Send + Sync {
    /// Fetch a fresh telemetry sample
    async fn read(&self) -> Result<TelemetrySample>;

    /// Fetch the vehicle's charging profile (available AC limits)
    async fn charging_profile(&self) -> Result<ChargingProfile>;
}

/// Write interface: charging and climate actuators
#[async_trait::async_trait]
pub trait VehicleControl: Send + Sync {
    /// Set the target SoC and AC current limit as one settings update
    async fn set_charging_settings(&self, target_soc: u8, ac_limit_amps: u16) -> Result<AckState>;

    /// Start cabin preconditioning
    async fn start_preconditioning(&self) -> Result<AckState>;

    /// Stop cabin preconditioning
    async fn stop_preconditioning(&self) -> Result<AckState>;
}
