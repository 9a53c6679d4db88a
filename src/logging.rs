use tracing::warn;
use tracing_subscriber::EnvFilter;

pub fn init(log_path: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    let Some(path) = log_path else {
        builder.init();
        return;
    };
    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        Err(err) => {
            builder.init();
            warn!("failed to open log file {}: {}, using stdout", path, err);
        }
    }
}
