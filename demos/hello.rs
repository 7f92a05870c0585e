use clap::{Arg, Command};
use logcast::types::Severity;
use logcast::{logd, logi, logw, LoggingConfig, Registry, SlogListener};
use slog::{o, Drain};
use std::sync::Arc;

#[macro_use]
extern crate trackable;

fn main() {
    let matches = Command::new("hello")
        .arg(Arg::new("CONFIG_FILE").index(1).required(true))
        .arg(
            Arg::new("slog")
                .long("slog")
                .action(clap::ArgAction::SetTrue)
                .help("Also forwards every message to a slog terminal logger"),
        )
        .get_matches();
    let config_file = matches
        .get_one::<String>("CONFIG_FILE")
        .expect("CONFIG_FILE is required");

    let config: LoggingConfig = track_try_unwrap!(serdeconv::from_toml_file(config_file));
    let registry: &'static Registry = Box::leak(Box::new(config.to_registry_builder().build()));
    let installation = track_try_unwrap!(config.install(registry));

    let _slog = if matches.get_flag("slog") {
        let decorator = slog_term::TermDecorator::new().build();
        let drain = slog_term::CompactFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        let logger = slog::Logger::root(drain, o!("demo" => "hello"));
        registry.register(Arc::new(SlogListener::new(logger)))
    } else {
        None
    };

    logi!(registry: registry, "Hello from {} listener(s)\n", installation.len());
    logw!(registry: registry, "Reporting level is {}\n", registry.reporting_level());
    logd!(registry: registry, "Only shown at {} or above\n", Severity::Debug);
}
