#[macro_use]
extern crate tracing;

use std::env;

use anyhow::{anyhow, Context};
use calloop::EventLoop;
use calloop_wayland_source::WaylandSource;
use clap::Parser;
use layerbar::backend::{Backend, Wayland};
use layerbar::cli::Cli;
use layerbar::session::State;
use layerbar::utils::default_config_path;
use layerbar_config::Config;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = if cfg!(debug_assertions) {
    "layerbar=debug,layerbar_config=debug"
} else {
    "layerbar=info,layerbar_config=info"
};

fn main() -> anyhow::Result<()> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .init();

    if cfg!(feature = "profile-with-tracy") {
        tracy_client::Client::start();
    }

    let cli = Cli::parse();

    info!("starting version {}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&cli)?;
    cli.apply(&mut config);

    let (wayland, event_queue, globals) = Wayland::new(&config)?;
    let connection = wayland.connection();
    let mut state = State::new(Backend::Wayland(wayland), config);

    for event in globals {
        state.handle(event);
    }
    if state.session.outputs.is_empty() {
        warn!("no outputs to show the bar on yet");
    }

    let mut event_loop: EventLoop<State> =
        EventLoop::try_new().context("error creating the event loop")?;
    WaylandSource::new(connection, event_queue)
        .insert(event_loop.handle())
        .map_err(|err| err.error)
        .context("error inserting the Wayland source")?;

    state.refresh_and_flush()?;

    let signal = event_loop.get_signal();
    let mut result = Ok(());
    event_loop
        .run(None, &mut state, |state| {
            if let Err(err) = state.refresh_and_flush() {
                result = Err(err);
                signal.stop();
                return;
            }

            if !state.session.is_running() {
                signal.stop();
            }
        })
        .context("error running the event loop")?;

    if result.is_ok() {
        info!("exiting");
    }
    result
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let (path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => {
                debug!("no home directory, using the default config");
                return Ok(Config::default());
            }
        },
    };

    if !explicit && !path.exists() {
        debug!("{path:?} does not exist, using the default config");
        return Ok(Config::default());
    }

    // miette reports do not implement std::error::Error, so render them here.
    Config::load(&path).map_err(|err| anyhow!("{err:?}"))
}
