//! HTTP implementation of the vehicle ports
//!
//! Thin reqwest client mapping the telemetry and control traits onto a
//! connected-vehicle REST API. Pure transport plumbing: no control logic
//! lives here. The client applies its own request timeout; the controller
//! imposes none of its own.

use crate::config::VehicleApiConfig;
use crate::error::{KairosError, Result};
use crate::logging::get_logger;
use crate::vehicle::{
    AckState, ChargingProfile, TelemetrySample, VehicleControl, VehicleTelemetry,
};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Vehicle API client speaking JSON over HTTPS
pub struct HttpVehicleClient {
    base_url: String,
    access_token: String,
    vin: String,
    client: reqwest::Client,
    logger: crate::logging::StructuredLogger,
}

#[derive(Debug, Deserialize)]
struct StatePayload {
    #[serde(rename = "remainingBatteryPercent")]
    remaining_battery_percent: u8,
    #[serde(rename = "chargingStatus")]
    charging_status: crate::vehicle::ChargingStatus,
    #[serde(rename = "estimatedCompletionTime")]
    estimated_completion_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "climateActivity")]
    climate_activity: crate::vehicle::ClimateActivity,
}

#[derive(Debug, Deserialize)]
struct ProfilePayload {
    #[serde(rename = "acAvailableLimits")]
    ac_available_limits: Vec<u16>,
    #[serde(rename = "acCurrentLimit")]
    ac_current_limit: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct AckPayload {
    state: AckState,
}

impl HttpVehicleClient {
    /// Create a client from the vehicle section of the configuration
    pub fn new(cfg: &VehicleApiConfig) -> Result<Self> {
        if cfg.access_token.trim().is_empty() {
            return Err(KairosError::auth("Vehicle API access token is empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            access_token: cfg.access_token.trim().to_string(),
            vin: cfg.vin.clone(),
            client,
            logger: get_logger("api"),
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/vehicles/{}/{}", self.base_url, self.vin, suffix)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, suffix: &str) -> Result<T> {
        let resp = self
            .client
            .get(self.url(suffix))
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Self::check_status(resp.status())?;
        Ok(resp.json::<T>().await?)
    }

    async fn post_json(&self, suffix: &str, body: serde_json::Value) -> Result<AckState> {
        let resp = self
            .client
            .post(self.url(suffix))
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;
        Self::check_status(resp.status())?;
        let ack: AckPayload = resp.json().await?;
        self.logger
            .debug(&format!("POST {} acknowledged {}", suffix, ack.state));
        Ok(ack.state)
    }

    fn check_status(status: StatusCode) -> Result<()> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(KairosError::auth(format!(
                "Vehicle API rejected credentials: {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(KairosError::transport(format!(
                "Vehicle API returned {}",
                status
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl VehicleTelemetry for HttpVehicleClient {
    async fn read(&self) -> Result<TelemetrySample> {
        let state: StatePayload = self.get_json("state").await?;
        Ok(TelemetrySample {
            remaining_battery_percent: state.remaining_battery_percent,
            charging_status: state.charging_status,
            estimated_completion_time: state.estimated_completion_time,
            climate_activity: state.climate_activity,
        })
    }

    async fn charging_profile(&self) -> Result<ChargingProfile> {
        let profile: ProfilePayload = self.get_json("charging-profile").await?;
        Ok(ChargingProfile {
            ac_available_limits: profile.ac_available_limits,
            ac_current_limit: profile.ac_current_limit,
        })
    }
}

#[async_trait::async_trait]
impl VehicleControl for HttpVehicleClient {
    async fn set_charging_settings(&self, target_soc: u8, ac_limit_amps: u16) -> Result<AckState> {
        self.post_json(
            "charging-settings",
            serde_json::json!({
                "targetSoc": target_soc,
                "acLimit": ac_limit_amps,
            }),
        )
        .await
    }

    async fn start_preconditioning(&self) -> Result<AckState> {
        self.post_json("climate/start", serde_json::json!({})).await
    }

    async fn stop_preconditioning(&self) -> Result<AckState> {
        self.post_json("climate/stop", serde_json::json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleApiConfig;

    fn cfg() -> VehicleApiConfig {
        VehicleApiConfig {
            base_url: "https://api.example.test/".to_string(),
            access_token: "token".to_string(),
            vin: "WBA00000000000000".to_string(),
        }
    }

    #[test]
    fn empty_token_is_rejected_up_front() {
        let mut c = cfg();
        c.access_token = "  ".to_string();
        assert!(matches!(
            HttpVehicleClient::new(&c),
            Err(KairosError::Auth { .. })
        ));
    }

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let client = HttpVehicleClient::new(&cfg()).unwrap();
        assert_eq!(
            client.url("state"),
            "https://api.example.test/vehicles/WBA00000000000000/state"
        );
    }

    #[test]
    fn auth_statuses_map_to_auth_errors() {
        assert!(matches!(
            HttpVehicleClient::check_status(StatusCode::UNAUTHORIZED),
            Err(KairosError::Auth { .. })
        ));
        assert!(matches!(
            HttpVehicleClient::check_status(StatusCode::BAD_GATEWAY),
            Err(KairosError::Transport { .. })
        ));
        assert!(HttpVehicleClient::check_status(StatusCode::OK).is_ok());
    }

    #[test]
    fn ack_payload_parses_wire_labels() {
        let ack: AckPayload = serde_json::from_str(r#"{"state":"PENDING"}"#).unwrap();
        assert_eq!(ack.state, AckState::Pending);
    }
}
