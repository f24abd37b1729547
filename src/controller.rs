//! Charge-window control engine
//!
//! The controller evaluates one telemetry sample per tick and issues at most
//! one corrective action so the predicted completion time stays inside the
//! session's window. Levers are exhausted strictly from finest to coarsest:
//! AC current steps first, then the preconditioning load, then target SoC.
//! The same ordering applies in both directions, which keeps oscillation to
//! a minimum since a coarse lever never moves while a finer one still can.

use crate::error::Result;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::session::ChargeSession;
use crate::soc::SocBounds;
use crate::vehicle::{
    ChargingStatus, ClimateActivity, TelemetrySample, VehicleControl, VehicleTelemetry,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// One corrective action per tick; actions are never combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Push a (target SoC, AC limit) settings pair to the vehicle
    SetChargingSettings { target_soc: u8, ac_limit_index: usize },
    /// Start cabin preconditioning to add parasitic load
    StartPreconditioning,
    /// Stop cabin preconditioning
    StopPreconditioning,
    /// No actuator change this tick
    NoOp(NoOpReason),
}

/// Why a tick made no actuator change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// Vehicle is not actively charging
    NotCharging,
    /// Predicted completion is inside the window
    OnTrack,
    /// Charging too fast but every slowing lever is exhausted
    CannotSlowDown,
    /// Charging too slow but every speeding lever is exhausted
    CannotSpeedUp,
    /// Status says charging but no completion estimate was reported
    NoEstimate,
}

/// Logical controller state, derived from the last observed charging status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Not actively charging; no actuator decisions are made
    AwaitingCharge,
    /// Actively charging; lever selection runs each tick
    Monitoring,
}

/// Stateful decision engine for one charging session
pub struct ChargeWindowController {
    session: ChargeSession,
    bounds: SocBounds,
    telemetry: Arc<dyn VehicleTelemetry>,
    control: Arc<dyn VehicleControl>,
    state: Option<ControllerState>,
    last_tick_time: Option<DateTime<Utc>>,
    logger: StructuredLogger,
}

impl ChargeWindowController {
    pub fn new(
        session: ChargeSession,
        bounds: SocBounds,
        telemetry: Arc<dyn VehicleTelemetry>,
        control: Arc<dyn VehicleControl>,
    ) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("controller").with_session_id(session.id.clone()),
        );
        Self {
            session,
            bounds,
            telemetry,
            control,
            state: None,
            last_tick_time: None,
            logger,
        }
    }

    pub fn session(&self) -> &ChargeSession {
        &self.session
    }

    pub fn state(&self) -> Option<ControllerState> {
        self.state
    }

    pub fn last_tick_time(&self) -> Option<DateTime<Utc>> {
        self.last_tick_time
    }

    /// Select the corrective action for a telemetry sample without touching
    /// session state. Pure on (session, bounds, sample).
    pub fn decide(&self, sample: &TelemetrySample) -> ControlAction {
        if sample.charging_status != ChargingStatus::Charging {
            return ControlAction::NoOp(NoOpReason::NotCharging);
        }

        let Some(estimated_end) = sample.estimated_completion_time else {
            return ControlAction::NoOp(NoOpReason::NoEstimate);
        };

        if estimated_end < self.session.min_end_time() {
            // Finishing early: slow down with the finest available lever
            if self.session.ac_limit_index() > 0 {
                ControlAction::SetChargingSettings {
                    target_soc: self.session.target_soc(),
                    ac_limit_index: self.session.ac_limit_index() - 1,
                }
            } else if sample.climate_activity != ClimateActivity::Cooling {
                ControlAction::StartPreconditioning
            } else if self.session.target_soc() < self.bounds.max() {
                ControlAction::SetChargingSettings {
                    target_soc: self.bounds.next_target(i16::from(self.session.target_soc())),
                    ac_limit_index: self.session.ac_limit_index(),
                }
            } else {
                ControlAction::NoOp(NoOpReason::CannotSlowDown)
            }
        } else if estimated_end > self.session.max_end_time() {
            // Finishing late: speed up, undoing coarse drags before raising current
            if sample.climate_activity == ClimateActivity::Cooling {
                ControlAction::StopPreconditioning
            } else if self.session.target_soc() > self.bounds.min() {
                ControlAction::SetChargingSettings {
                    target_soc: self
                        .bounds
                        .next_target(i16::from(self.session.target_soc()) - 10),
                    ac_limit_index: self.session.ac_limit_index(),
                }
            } else if self.session.ac_limit_index() + 1 < self.session.ac_limit_options().len() {
                ControlAction::SetChargingSettings {
                    target_soc: self.session.target_soc(),
                    ac_limit_index: self.session.ac_limit_index() + 1,
                }
            } else {
                ControlAction::NoOp(NoOpReason::CannotSpeedUp)
            }
        } else {
            ControlAction::NoOp(NoOpReason::OnTrack)
        }
    }

    /// Run one full tick: read telemetry, decide, apply at most one action.
    ///
    /// Port failures abort this tick and propagate to the caller; the next
    /// tick proceeds independently. A rejected acknowledgement is logged and
    /// leaves session state untouched so the next tick re-evaluates from the
    /// current assumed state.
    pub async fn run_tick(&mut self) -> Result<()> {
        let mut sample = self.telemetry.read().await?;
        self.sanitize(&mut sample);

        self.session
            .set_preconditioning_active(sample.climate_activity == ClimateActivity::Cooling);
        self.transition(&sample);

        self.logger.info(&format!(
            "Remaining battery: {}%",
            sample.remaining_battery_percent
        ));
        if sample.charging_status == ChargingStatus::Charging {
            if let Some(end) = sample.estimated_completion_time {
                self.logger
                    .info(&format!("Charging estimated until {}", end.to_rfc3339()));
            }
        }

        let action = self.decide(&sample);
        match action {
            ControlAction::NoOp(reason) => self.report_noop(reason, &sample),
            _ => self.apply(action).await?,
        }

        self.last_tick_time = Some(Utc::now());
        Ok(())
    }

    /// Clamp out-of-bounds telemetry values instead of aborting the tick
    fn sanitize(&self, sample: &mut TelemetrySample) {
        if sample.remaining_battery_percent > 100 {
            self.logger.warn(&format!(
                "Telemetry reported battery {}%, clamping to 100%",
                sample.remaining_battery_percent
            ));
            sample.remaining_battery_percent = 100;
        }
    }

    fn transition(&mut self, sample: &TelemetrySample) {
        let next = if sample.charging_status == ChargingStatus::Charging {
            ControllerState::Monitoring
        } else {
            ControllerState::AwaitingCharge
        };
        if self.state != Some(next) {
            self.logger.info(&format!(
                "Controller state: {:?} (charging status {:?})",
                next, sample.charging_status
            ));
        }
        self.state = Some(next);
    }

    fn report_noop(&self, reason: NoOpReason, sample: &TelemetrySample) {
        match reason {
            NoOpReason::NotCharging => self.logger.info(&format!(
                "Charging status: {:?}, no action",
                sample.charging_status
            )),
            NoOpReason::OnTrack => self.logger.info("Charging on track"),
            NoOpReason::CannotSlowDown => self.logger.warn("Cannot slow down charging"),
            NoOpReason::CannotSpeedUp => self.logger.warn("Cannot speed up charging"),
            NoOpReason::NoEstimate => self
                .logger
                .warn("Charging but no completion estimate reported, skipping decision"),
        }
    }

    /// Issue the action via the control port, committing the session mutation
    /// only when the vehicle accepted (or queued) the request.
    async fn apply(&mut self, action: ControlAction) -> Result<()> {
        let ack = match action {
            ControlAction::SetChargingSettings {
                target_soc,
                ac_limit_index,
            } => {
                let amps = self
                    .session
                    .ac_limit_at(ac_limit_index)
                    .unwrap_or_else(|| self.session.current_ac_limit());
                self.describe_settings_change(target_soc, ac_limit_index, amps);
                self.control.set_charging_settings(target_soc, amps).await?
            }
            ControlAction::StartPreconditioning => {
                self.logger.info("Starting preconditioning");
                self.control.start_preconditioning().await?
            }
            ControlAction::StopPreconditioning => {
                self.logger.info("Stopping preconditioning");
                self.control.stop_preconditioning().await?
            }
            ControlAction::NoOp(_) => return Ok(()),
        };

        if ack.is_success() {
            self.commit(action);
            self.logger.info(&format!("Vehicle acknowledged: {}", ack));
        } else {
            self.logger.warn(&format!(
                "Vehicle rejected {:?} ({}), keeping current state",
                action, ack
            ));
        }
        Ok(())
    }

    fn describe_settings_change(&self, target_soc: u8, ac_limit_index: usize, amps: u16) {
        if ac_limit_index < self.session.ac_limit_index() {
            self.logger.info(&format!("Reducing AC limit to {amps}A"));
        } else if ac_limit_index > self.session.ac_limit_index() {
            self.logger.info(&format!("Increasing AC limit to {amps}A"));
        } else if target_soc > self.session.target_soc() {
            self.logger
                .info(&format!("Increasing target SoC to {target_soc}%"));
        } else if target_soc < self.session.target_soc() {
            self.logger
                .info(&format!("Decreasing target SoC to {target_soc}%"));
        }
    }

    fn commit(&mut self, action: ControlAction) {
        match action {
            ControlAction::SetChargingSettings {
                target_soc,
                ac_limit_index,
            } => {
                self.session.set_target_soc(target_soc);
                self.session.set_ac_limit_index(ac_limit_index);
            }
            ControlAction::StartPreconditioning => {
                self.session.set_preconditioning_active(true);
            }
            ControlAction::StopPreconditioning => {
                self.session.set_preconditioning_active(false);
            }
            ControlAction::NoOp(_) => {}
        }
    }
}
