use credit_risk_api::logging::init_logging;
use credit_risk_api::{run, ServerError, ServiceConfig};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let (config, format_err) = ServiceConfig::from_env();
    init_logging(&config.log)?;
    if let Some(err) = format_err {
        warn!(error = %err, "falling back to compact log format");
    }
    run(config).await
}
