pub mod audio_backend;
pub mod scene;

/// Installs a stderr subscriber. `RUST_LOG` overrides the default `info` level.
///
/// Records emitted through `log` by the DSP core are forwarded as well.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
