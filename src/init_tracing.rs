use anyhow::{Context, Result};
use opentelemetry::sdk::resource::{EnvResourceDetector, SdkProvidedResourceDetector};
use opentelemetry::sdk::{trace as sdktrace, Resource};
use opentelemetry_otlp::{HasExportConfig, WithExportConfig};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;

const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

fn init_tracer() -> Result<(sdktrace::Tracer, String)> {
    let mut exporter = opentelemetry_otlp::new_exporter().tonic().with_env();
    let endpoint = exporter.export_config().endpoint.clone();

    if std::env::var_os("OTEL_SERVICE_NAME").is_none() {
        std::env::set_var("OTEL_SERVICE_NAME", env!("CARGO_PKG_NAME"));
    }

    let resource = Resource::from_detectors(
        Duration::from_secs(0),
        vec![
            Box::new(EnvResourceDetector::new()),
            Box::new(SdkProvidedResourceDetector),
        ],
    );

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(sdktrace::config().with_resource(resource))
        .install_batch(opentelemetry::runtime::Tokio)?;

    Ok((tracer, endpoint))
}

/// Logs to stderr, filtered by `RUST_LOG` (default `asistencia=info`).
///
/// Spans are also exported over OTLP when `OTEL_EXPORTER_OTLP_ENDPOINT` is set. Must be called
/// inside a tokio runtime in that case.
pub fn init_tracing() -> Result<()> {
    let (tracer, endpoint) = match std::env::var_os(OTLP_ENDPOINT_VAR) {
        Some(_) => {
            let (tracer, endpoint) =
                init_tracer().context("Setting up the opentelemetry exporter")?;
            (Some(tracer), Some(endpoint))
        }
        None => (None, None),
    };

    let default = concat!(env!("CARGO_PKG_NAME"), "=info")
        .parse()
        .context("Parsing default log directive")?;

    Registry::default()
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default)
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::Layer::new().with_writer(std::io::stderr))
        .with(tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer)))
        .init();

    if let Some(endpoint) = endpoint {
        debug!("Using opentelemetry endpoint {}", endpoint);
    }

    Ok(())
}

/// Flushes spans still buffered by the OTLP exporter.
pub fn shutdown_tracing() {
    if std::env::var_os(OTLP_ENDPOINT_VAR).is_some() {
        opentelemetry::global::shutdown_tracer_provider();
    }
}
