use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

/// Composes the layers used to process spans into one `tracing` Subscriber:
/// an env-based filter, the JSON storage layer, and a bunyan-compatible
/// formatting layer writing to `sink`.
///
/// # Arguments
/// - `name`: name of the app, attached to every log record
/// - `fallback_env_filter`: filter directive used when RUST_LOG is not set
/// - `sink`: where the formatted records are written
///
/// Returns `impl Subscriber` to avoid spelling out the layered type.
pub fn get_tracing_subscriber<Sink>(
    name: String,
    fallback_env_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    // HRTB: the sink must implement `MakeWriter` for every lifetime `'a`.
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_env_filter));

    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Registers a Subscriber as the global default to process span data.
///
/// Also redirects all `log` events to the subscriber. Should only be
/// called once.
pub fn init_tracing_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");

    set_global_default(subscriber).expect("Failed to set subscriber");
}
