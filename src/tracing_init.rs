// Initializes the tracing subscriber for the Lambda binaries.

use std::env;
use std::io::IsTerminal;

use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::TracingConfig;

const EVENT_FILTER_ENV_VAR: &str = "RUST_LOG";

const CRATE_TARGETS: [&str; 3] = ["aurora_log_archiver", "log_file_filter", "log_uploader"];
const AWS_SDK_TARGETS: [&str; 4] = ["aws_smithy_runtime", "aws_config", "aws_sigv4", "reqwest"];

/// Builds the `EnvFilter` directive string and whether targets are shown.
///
/// `AWS_SDK_TRACING` wins over `RUST_LOG`; without either only this crate's
/// targets are enabled.
fn event_filter(config: &TracingConfig, rust_log: Option<String>) -> (String, bool) {
    let tracing_level = config.tracing_level;
    let directives = |targets: &[&str]| {
        targets
            .iter()
            .map(|target| format!("{target}={tracing_level}"))
            .collect::<Vec<_>>()
            .join(",")
    };

    if config.aws_sdk_tracing {
        let targets: Vec<&str> = CRATE_TARGETS
            .iter()
            .chain(AWS_SDK_TARGETS.iter())
            .copied()
            .collect();
        (directives(&targets), true)
    } else if let Some(rust_log) = rust_log {
        (rust_log, true)
    } else {
        (directives(&CRATE_TARGETS), false)
    }
}

pub fn init_tracing(config: &TracingConfig) {
    let fmt_span = if config.span_events_tracing {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let (event_filter, show_target) = event_filter(config, env::var(EVENT_FILTER_ENV_VAR).ok());

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .compact()
        .with_ansi(!config.disable_color_tracing && std::io::stdout().is_terminal())
        .with_span_events(fmt_span)
        .with_env_filter(event_filter)
        .with_target(show_target);

    if config.json_tracing {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }
}
