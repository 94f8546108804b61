use tracing_subscriber::EnvFilter;

// HERALD_LOG follows the usual env-filter syntax; runs default to info so
// the Actions log shows the trigger/authorize/dispatch milestones.
pub(crate) fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_env("HERALD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
