//! ircserv, a small IRC server.
//!
//! # Usage
//!
//! ```console
//! ircserv <port> <password>
//! ```
//!
//! The server listens on `127.0.0.1:<port>`.  Clients must send `PASS <password>` before they can
//! register, unless the password is empty.
//!
//! Logging is configured through `IRCSERV_LOG` (defaults to `ircserv=debug`), with the syntax of
//! `env_logger`.
//!
//! During development: `cargo run -- 6667 hunter2`

#![forbid(unsafe_code)]
#![warn(clippy::all, rust_2018_idioms)]
#![allow(clippy::shadow_unrelated, clippy::use_self)]

pub use crate::client::MessageQueueItem;
pub use crate::config::Config;
pub use crate::net::Shutdown;
pub use crate::state::State;
use std::sync::Arc;
use std::{env, process};

mod channel;
mod client;
pub mod config;
#[macro_use]
mod lines;
pub mod net;
mod reader;
mod state;

/// The beginning of everything
pub fn start() {
    if cfg!(debug_assertions) {
        env::set_var("RUST_BACKTRACE", "1");
    }

    let log_settings = env_logger::Env::new()
        .filter_or("IRCSERV_LOG", "ircserv=debug")
        .write_style("IRCSERV_LOG_STYLE");
    env_logger::Builder::from_env(log_settings)
        .format(|buf, r| {
            use std::io::Write;
            writeln!(buf, "[{:<5} {}] {}", r.level(), r.target(), r.args())
        })
        .init();

    let cfg = Config::from_args(env::args()).unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|err| {
            log::error!("Failed to start the tokio runtime: {}", err);
            process::exit(1);
        });

    runtime.block_on(async move {
        let listener = net::listen(cfg.binding).await.unwrap_or_else(|err| {
            log::error!("Failed to listen on {}: {}", cfg.binding, err);
            process::exit(1);
        });

        let shutdown = Arc::new(Shutdown::new());
        tokio::spawn(watch_signals(shutdown.clone()));

        net::run(listener, State::new(cfg.state), shutdown).await;
    });
}

/// Requests a shutdown on the first SIGINT.
async fn watch_signals(shutdown: Arc<Shutdown>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            log::info!("Received interrupt signal");
            shutdown.request();
        }
        Err(err) => log::warn!("Failed to listen for interrupt signals: {}", err),
    }
}
