use tracing_subscriber::{fmt, EnvFilter};

/// Console logging filtered by `RUST_LOG`, defaulting to `info`.
pub fn init() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .try_init();
}
