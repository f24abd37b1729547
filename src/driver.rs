//! Charge-window service orchestration
//!
//! This module hosts the long-running control loop: bootstrap the session
//! from the vehicle's reported state, then drive the controller on the
//! configured tick interval until shutdown. Fatal errors abort bootstrap;
//! per-tick errors are logged at the tick boundary and the loop continues.

use crate::config::Config;
use crate::controller::ChargeWindowController;
use crate::error::Result;
use crate::logging::get_logger;
use crate::scheduler::TickScheduler;
use crate::session::ChargeSession;
use crate::soc::SocBounds;
use crate::vehicle::{VehicleControl, VehicleTelemetry};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Main driver state
#[derive(Debug, Clone)]
pub enum DriverState {
    /// Driver is initializing
    Initializing,
    /// Driver is running the control loop
    Running,
    /// Driver is shutting down
    ShuttingDown,
}

/// Long-running host for one `ChargeWindowController`
pub struct ChargeDriver {
    /// Configuration, immutable for the process lifetime
    config: Config,

    /// Current driver state
    state: watch::Sender<DriverState>,

    /// Telemetry read port
    telemetry: Arc<dyn VehicleTelemetry>,

    /// Actuator write port
    control: Arc<dyn VehicleControl>,

    /// Logger with context
    logger: crate::logging::StructuredLogger,

    /// Shutdown signal
    shutdown_tx: mpsc::UnboundedSender<()>,

    /// Shutdown receiver
    shutdown_rx: mpsc::UnboundedReceiver<()>,
}

impl ChargeDriver {
    /// Create a new driver instance. The configuration is validated here so
    /// the control loop can rely on its invariants.
    pub fn new(
        config: Config,
        telemetry: Arc<dyn VehicleTelemetry>,
        control: Arc<dyn VehicleControl>,
    ) -> Result<Self> {
        config.validate()?;

        let logger = get_logger("driver");
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(DriverState::Initializing);

        logger.info("Initializing charge-window driver");

        Ok(Self {
            config,
            state: state_tx,
            telemetry,
            control,
            logger,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Run the driver until shutdown is requested
    pub async fn run(&mut self) -> Result<()> {
        self.logger.info("Starting charge-window control loop");

        let mut controller = self.bootstrap().await?;
        self.state.send(DriverState::Running).ok();

        let mut scheduler =
            TickScheduler::new(Duration::from_secs(self.config.tick_interval_secs));

        loop {
            tokio::select! {
                _ = scheduler.tick() => {
                    if let Err(e) = controller.run_tick().await {
                        self.logger.error(&format!("Tick failed: {}", e));
                        // A bad tick never terminates the controller
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }

        self.state.send(DriverState::ShuttingDown).ok();
        self.logger.info("Driver shutdown complete");
        Ok(())
    }

    /// Read the vehicle's state once and build the session and controller.
    /// Any failure here is fatal; the loop never starts.
    async fn bootstrap(&self) -> Result<ChargeWindowController> {
        let sample = self.telemetry.read().await?;
        let profile = self.telemetry.charging_profile().await?;

        let bounds = SocBounds::from(&self.config.soc);
        let session = ChargeSession::new(
            Utc::now(),
            &self.config.window,
            bounds,
            sample.remaining_battery_percent,
            profile,
        )?;

        self.logger.info(&format!(
            "Charging session {} from {} until between {} and {} with target SoC between {}% and {}%",
            session.id,
            session.start_time().to_rfc3339(),
            session.min_end_time().to_rfc3339(),
            session.max_end_time().to_rfc3339(),
            bounds.min(),
            bounds.max(),
        ));

        self.logger.info(&format!(
            "Initializing with target SoC {}% and AC limit {}A",
            session.target_soc(),
            session.current_ac_limit()
        ));
        let ack = self
            .control
            .set_charging_settings(session.target_soc(), session.current_ac_limit())
            .await?;
        self.logger
            .info(&format!("Initial settings acknowledged: {}", ack));

        Ok(ChargeWindowController::new(
            session,
            bounds,
            Arc::clone(&self.telemetry),
            Arc::clone(&self.control),
        ))
    }

    /// Get current driver state
    pub fn get_state(&self) -> DriverState {
        self.state.borrow().clone()
    }

    /// Request shutdown
    pub fn request_shutdown(&self) {
        self.shutdown_tx.send(()).ok();
    }

    /// Handle for requesting shutdown from another task
    pub fn shutdown_handle(&self) -> mpsc::UnboundedSender<()> {
        self.shutdown_tx.clone()
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }
}
