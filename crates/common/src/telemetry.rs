use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber for a plugin process.
///
/// Stdout carries the protoc response, so everything is written to stderr.
/// `RUST_LOG` wins over `default_level` when set.
pub fn init_tracing(plugin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false),
        )
        .try_init();

    if let Err(e) = installed {
        tracing::debug!("Keeping existing subscriber: {}", e);
    }

    tracing::debug!("Starting plugin: {}", plugin_name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_keeps_the_first_subscriber() {
        init_tracing("protoc-gen-go-tetragon", "debug");
        init_tracing("protoc-gen-go-tetragon", "not a directive [");
        assert!(tracing::dispatcher::has_been_set());
    }
}
