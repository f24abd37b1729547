use anyhow::Result;
use kairos::config::Config;
use kairos::driver::ChargeDriver;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    kairos::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    info!("Kairos charge-window controller starting up");

    #[cfg(feature = "api")]
    let client = Arc::new(
        kairos::api::HttpVehicleClient::new(&config.vehicle)
            .map_err(|e| anyhow::anyhow!("Failed to create vehicle client: {}", e))?,
    );
    #[cfg(not(feature = "api"))]
    return Err(anyhow::anyhow!(
        "Built without the `api` feature; no vehicle client available"
    ));

    #[cfg(feature = "api")]
    {
        let mut driver = ChargeDriver::new(config, client.clone(), client)
            .map_err(|e| anyhow::anyhow!("Failed to create driver: {}", e))?;

        // Forward Ctrl-C to the driver's shutdown channel
        let shutdown = driver.shutdown_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown.send(());
            }
        });

        match driver.run().await {
            Ok(()) => {
                info!("Driver shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!("Driver failed with error: {}", e);
                Err(anyhow::anyhow!("Driver error: {}", e))
            }
        }
    }
}
