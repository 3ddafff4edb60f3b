use anyhow::Result;
use std::env::var;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Build the log filter: the CLI verbosity is the default directive and
/// `RUST_LOG` may refine it. Chatty transport crates are capped.
fn build_filter(verbosity_level: Option<Level>) -> Result<EnvFilter> {
    let verbosity_level = verbosity_level.unwrap_or(Level::ERROR);

    Ok(EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("tokio=error".parse()?)
        .add_directive("sqlx=warn".parse()?))
}

/// Initialize logging.
/// Output is pretty-printed unless `QUIZ_LOG_FORMAT=json`.
///
/// # Errors
///
/// Returns an error if the subscriber cannot be installed
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let filter = build_filter(verbosity_level)?;

    let json = var("QUIZ_LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(false);
        let subscriber = Registry::default().with(fmt_layer).with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let fmt_layer = fmt::layer()
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_target(false)
            .pretty();
        let subscriber = Registry::default().with(fmt_layer).with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
