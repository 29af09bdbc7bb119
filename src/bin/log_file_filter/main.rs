use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info};

use aurora_log_archiver::config::TracingConfig;
use aurora_log_archiver::config::env::ProcessEnv;
use aurora_log_archiver::handler::discovery_handler;
use aurora_log_archiver::tracing_init::init_tracing;
use aurora_log_archiver::types::error::exit_code_from_error;

/// Discovery function: lists the log files of a cluster that still need exporting.
///
/// This binary is a thin wrapper over the aurora-log-archiver library.
#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing(&TracingConfig::from_env(&ProcessEnv));

    lambda_runtime::run(service_fn(handle)).await
}

#[cfg_attr(coverage_nightly, coverage(off))]
async fn handle(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();
    info!(request_id = context.request_id, "discovery invoked.");

    match discovery_handler(payload, &ProcessEnv).await {
        Ok(log_files) => Ok(serde_json::to_value(log_files)?),
        Err(e) => {
            error!(request_id = context.request_id, "discovery failed: {e:?}");
            std::process::exit(exit_code_from_error(&e));
        }
    }
}
