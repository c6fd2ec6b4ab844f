//! wmibar entry point.
//!
//! Opens the bar window, serves the control socket, and runs the event
//! loop until a client writes `quit` to `/ctl` or the window is closed.

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};

use cli::Parsed;
use wmibar_backend_sdl::{LoopEvent, SdlBar};
use wmibar_core::{Bar, BarConfig, ShellSpawner};
use wmibar_net::SocketServer;

type SdlWmiBar = Bar<SdlBar, ShellSpawner>;

fn main() -> Result<()> {
    let args = match cli::parse() {
        Parsed::Run(args) => args,
        Parsed::Done => return Ok(()),
        Parsed::Usage => std::process::exit(1),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match &args.config {
        Some(path) => BarConfig::load(path)?,
        None => BarConfig::default(),
    };

    let backend = SdlBar::new("wmibar").context("cannot open display")?;
    let sink = Arc::new(backend.request_sink());
    let mut bar = Bar::new(
        backend,
        ShellSpawner::new(config.shell.as_str()),
        &config,
        args.geometry.as_deref(),
    )?;

    let mut server = SocketServer::bind(&args.socket)
        .with_context(|| format!("cannot bind control socket {}", args.socket.display()))?
        .spawn(sink)?;
    log::info!("wmibar listening on {}", args.socket.display());

    run(&mut bar);

    log::info!("wmibar shutting down");
    server.shutdown();
    Ok(())
}

/// Serve requests and window events until shutdown.
fn run(bar: &mut SdlWmiBar) {
    while !bar.is_shutdown() {
        let first = bar.backend_mut().wait_event();
        handle(bar, first);
        while !bar.is_shutdown() {
            let Some(event) = bar.backend_mut().poll_event() else {
                break;
            };
            handle(bar, event);
        }
    }
}

fn handle(bar: &mut SdlWmiBar, event: LoopEvent) {
    match event {
        LoopEvent::Request(exchange) => {
            let response = exchange.request.apply(bar);
            if exchange.reply.send(response).is_err() {
                log::debug!("client went away before its reply");
            }
        },
        LoopEvent::Native(event) => bar.handle_event(&event),
    }
}
