use tracing::Level;

pub fn init_logging() {
    init_logging_with(Level::INFO);
}

pub fn init_logging_with(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .try_init();
}
