use kairos::config::Config;
use kairos::driver::ChargeDriver;
use kairos::error::{KairosError, Result};
use kairos::vehicle::{
    AckState, ChargingProfile, ChargingStatus, ClimateActivity, TelemetrySample, VehicleControl,
    VehicleTelemetry,
};
use std::sync::{Arc, Mutex};

struct FakeVehicle {
    settings_calls: Mutex<Vec<(u8, u16)>>,
    fail_bootstrap: bool,
}

impl FakeVehicle {
    fn new() -> Self {
        Self {
            settings_calls: Mutex::new(Vec::new()),
            fail_bootstrap: false,
        }
    }

    fn failing() -> Self {
        Self {
            settings_calls: Mutex::new(Vec::new()),
            fail_bootstrap: true,
        }
    }
}

#[async_trait::async_trait]
impl VehicleTelemetry for FakeVehicle {
    async fn read(&self) -> Result<TelemetrySample> {
        if self.fail_bootstrap {
            return Err(KairosError::auth("invalid credentials"));
        }
        Ok(TelemetrySample {
            remaining_battery_percent: 42,
            charging_status: ChargingStatus::Charging,
            estimated_completion_time: None,
            climate_activity: ClimateActivity::Off,
        })
    }

    async fn charging_profile(&self) -> Result<ChargingProfile> {
        Ok(ChargingProfile {
            ac_available_limits: vec![6, 8, 10, 16],
            ac_current_limit: Some(10),
        })
    }
}

#[async_trait::async_trait]
impl VehicleControl for FakeVehicle {
    async fn set_charging_settings(&self, target_soc: u8, ac_limit_amps: u16) -> Result<AckState> {
        self.settings_calls
            .lock()
            .unwrap()
            .push((target_soc, ac_limit_amps));
        Ok(AckState::Accepted)
    }

    async fn start_preconditioning(&self) -> Result<AckState> {
        Ok(AckState::Accepted)
    }

    async fn stop_preconditioning(&self) -> Result<AckState> {
        Ok(AckState::Accepted)
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.vehicle.vin = "WBA12345678901234".to_string();
    config
}

#[tokio::test]
async fn bootstrap_applies_initial_settings_then_shutdown_stops_the_loop() {
    let vehicle = Arc::new(FakeVehicle::new());
    let mut driver = ChargeDriver::new(test_config(), vehicle.clone(), vehicle.clone()).unwrap();

    // Queue the shutdown before the loop starts; bootstrap still runs first
    driver.request_shutdown();
    driver.run().await.unwrap();

    // Initial target from SoC 42 quantizes to 50; present 10A limit is kept
    assert_eq!(vehicle.settings_calls.lock().unwrap().clone(), vec![(50, 10)]);
}

#[tokio::test]
async fn bootstrap_failure_is_fatal() {
    let vehicle = Arc::new(FakeVehicle::failing());
    let mut driver = ChargeDriver::new(test_config(), vehicle.clone(), vehicle).unwrap();

    let err = driver.run().await.unwrap_err();
    assert!(matches!(err, KairosError::Auth { .. }));
}

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let vehicle = Arc::new(FakeVehicle::new());
    let mut config = test_config();
    config.tick_interval_secs = 0;

    assert!(ChargeDriver::new(config, vehicle.clone(), vehicle).is_err());
}
