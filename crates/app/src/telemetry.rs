//! Tracing setup for the CLI.
//!
//! `TUTOR_LOG` holds filter directives (default `info`). `TUTOR_LOG_FORMAT=json`
//! switches to structured output. Logs go to stderr so command output on
//! stdout stays clean.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("TUTOR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match std::env::var("TUTOR_LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
