//! Tokenize and build the lines of ircserv's chat protocol.
//!
//! Parsing borrows from the input line, and the builders in `Buffer`/`ReplyBuffer` write
//! straight into a `String`, so a whole reply burst costs one allocation.

#![forbid(unsafe_code)]
#![warn(clippy::all, rust_2018_idioms)]
#![allow(clippy::shadow_unrelated, clippy::use_self)]

pub use buffers::{Buffer, MessageBuffer, ReplyBuffer};
pub use command::Command;
pub use message::{Message, MESSAGE_LENGTH};

mod buffers;
mod command;
mod message;
pub mod mode;
pub mod rpl;

/// Assert all data of a message.
///
/// `params` is compared against the middle parameters followed by the trailing argument, if any.
/// Empty elements in `params` are not compared, but still count for the number of parameters.
pub fn assert_msg(msg: &Message<'_>, prefix: Option<&str>, command: &str, params: &[&str]) {
    assert_eq!(msg.prefix, prefix, "prefix of {:?}", msg);
    assert_eq!(msg.command, command, "command of {:?}", msg);
    let actual: Vec<&str> = msg.arguments().collect();
    assert_eq!(actual.len(), params.len(), "number of parameters of {:?}", msg);
    for (i, (actual, expected)) in actual.iter().zip(params.iter()).enumerate() {
        if expected.is_empty() {
            // Some parameters change every run (creation time, peer address...).
            continue;
        }
        assert_eq!(actual, expected, "parameter #{} of {:?}", i, msg);
    }
}
