//! Configuration structures.
//!
//! ircserv is configured from its command line: `ircserv <port> <password>`.  An empty password
//! lets every client in without PASS.

use std::net;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Used when the hostname of the machine cannot be used as the server domain.
const DEFAULT_DOMAIN: &str = "ircserv.localhost";

#[derive(Debug, Error)]
pub enum Error {
    #[error("usage: {0} <port> <password>")]
    Usage(String),

    #[error("invalid port {0:?}: expected an integer between 1 and 65535")]
    InvalidPort(String),
}

/// Settings for `State`.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    /// Prefix of every message sent by the server.
    pub domain: String,

    /// The connection password.  Empty means none is required.
    pub password: String,
}

impl State {
    /// Settings used by tests and benchmarks.
    pub fn sample() -> Self {
        Self {
            domain: String::from("ircserv.test"),
            password: String::new(),
        }
    }
}

/// The whole configuration of the server.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The address the listener is bound to.
    pub binding: net::SocketAddr,

    pub state: State,
}

impl Config {
    /// Builds the configuration from the command-line arguments, the program name included.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let program = args.next().unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());

        let (port, password) = match (args.next(), args.next(), args.next()) {
            (Some(port), Some(password), None) => (port, password),
            _ => return Err(Error::Usage(program)),
        };

        Ok(Self {
            binding: net::SocketAddr::from(([127, 0, 0, 1], parse_port(&port)?)),
            state: State {
                domain: domain(),
                password,
            },
        })
    }
}

/// Parses a listening port.  Port 0 is refused, as clients could not know where to connect.
fn parse_port(s: &str) -> Result<u16> {
    match s.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(Error::InvalidPort(s.to_owned())),
    }
}

fn domain() -> String {
    match gethostname::gethostname().into_string() {
        Ok(hostname) if !hostname.is_empty() && !hostname.contains(' ') => hostname,
        _ => {
            log::warn!("Hostname is not usable as a domain, using {:?}", DEFAULT_DOMAIN);
            String::from(DEFAULT_DOMAIN)
        }
    }
}
