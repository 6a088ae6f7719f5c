use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Installs a console subscriber. RUST_LOG overrides the default filter.
// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info")
            .add_directive("terrain_core=debug".parse().expect("static directive"))
            .add_directive("terrain_storage=debug".parse().expect("static directive"))
    });

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_line_number(true))
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("logging initialized");
    }
}
