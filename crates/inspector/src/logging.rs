use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// `-v` flags beat the configured directive, which already folds in
/// `HWPOSTURE_LOG` over the `[log]` section.
pub fn filter_directive(verbose: u8, configured: Option<&str>) -> String {
    match verbose {
        0 => configured
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_FILTER)
            .to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the stderr subscriber; stdout carries only rendered records.
pub fn init(verbose: u8, configured: Option<&str>) {
    let directive = filter_directive(verbose, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        eprintln!("invalid log filter {directive:?} ({err}); using {DEFAULT_FILTER}");
        EnvFilter::new(DEFAULT_FILTER)
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
