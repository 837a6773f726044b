//! Server state and API to handle incoming commands.
//!
//! This module is split in several files:
//!
//! - `mod.rs`: public API of the server state, routing and send utilities
//! - `rfc2812.rs`: handlers for the channel and messaging commands
//! - `capabilities.rs`: handler for the CAP command

use crate::channel::{Channel, MemberModes};
use crate::client::{Client, MessageQueue, MessageQueueItem};
use crate::{config, lines};
use ircserv_tokens::{mode, rpl, Buffer, Command, Message, ReplyBuffer};
use slab::Slab;
use std::collections::HashMap;
use std::net;
use std::time::SystemTime;

mod capabilities;
mod rfc2812;

#[macro_export]
macro_rules! server_version {
    () => {
        concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"))
    };
}

const MAX_CHANNEL_NAME_LENGTH: usize = 200;
const MAX_NICKNAME_LENGTH: usize = 9;

type ChannelMap = HashMap<String, Channel>;
type ClientMap = Slab<Client>;
type HandlerResult = Result<(), ()>;

struct CommandContext<'a> {
    id: usize,
    rb: &'a mut ReplyBuffer,
}

/// Whether `s` can name a channel: it starts with `#` or `&` and holds no space, comma or BEL.
pub fn is_valid_channel_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some('#') | Some('&'))
        && s.len() <= MAX_CHANNEL_NAME_LENGTH
        && chars.all(|c| c != ' ' && c != ',' && c != '\x07')
}

/// Whether `s` is a valid nickname: a letter, followed by up to eight letters, digits or
/// characters among ``-_[]\`{}^``.
pub fn is_valid_nickname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            s.len() <= MAX_NICKNAME_LENGTH
                && chars.all(|c| c.is_ascii_alphanumeric() || "-_[]\\`{}^".contains(c))
        }
        _ => false,
    }
}

/// The registry key of a channel: its name without the leading `#` or `&`.
///
/// "#town" and "&town" are the same channel.
fn channel_key(name: &str) -> &str {
    name.strip_prefix(|c| c == '#' || c == '&').unwrap_or(name)
}

/// State of the chat server.
///
/// Owns every client and every channel.  Clients are identified by the `usize` handle returned
/// by `peer_joined`, which is also the key of their connection in the reactor.  All methods run
/// on the reactor thread, one message at a time.
///
/// # Example
///
/// ```rust
/// # use ircserv::{config, State};
/// # use ircserv_tokens::Message;
/// let mut state = State::new(config::State::sample());
///
/// // The state pushes the messages meant for the client onto this queue.
/// let (queue, mut outgoing) = tokio::sync::mpsc::unbounded_channel();
/// let id = state.peer_joined(queue, "127.0.0.1:6667".parse().unwrap());
///
/// let _ = state.handle_message(id, Message::parse("NICK ser"));
/// let _ = state.handle_message(id, Message::parse("USER ser 0 * :ser"));
///
/// let mut lines = Vec::new();
/// while let Ok(item) = outgoing.try_recv() {
///     let s: &str = item.as_ref();
///     lines.extend(s.lines().map(str::to_owned));
/// }
/// assert!(lines[0].contains("NOTICE"));
/// assert!(lines.iter().any(|l| l.starts_with(":ircserv.test 001 ser ")));
/// ```
pub struct State {
    /// The domain of the server.  Prefix of the replies sent to clients.
    domain: String,

    /// The connection password.  Empty means none is required.
    password: String,

    /// When the server started, sent in RPL_CREATED.
    created_at: String,

    clients: ClientMap,

    /// Channels by registry key, see `channel_key`.
    channels: ChannelMap,
}

impl State {
    pub fn new(config: config::State) -> Self {
        Self {
            domain: config.domain,
            password: config.password,
            created_at: humantime::format_rfc3339_seconds(SystemTime::now()).to_string(),
            clients: Slab::new(),
            channels: HashMap::new(),
        }
    }

    /// Adds a new connection to the state and greets it.
    ///
    /// Returns the handle of the new client.  The queue is used to push messages back to the
    /// peer.
    pub fn peer_joined(&mut self, queue: MessageQueue, addr: net::SocketAddr) -> usize {
        let client = Client::new(queue, addr.ip().to_string(), self.password.is_empty());
        let id = self.clients.insert(client);
        log::debug!("{}: Connected from {}", id, addr);

        let mut rb = ReplyBuffer::new(&self.domain, "*");
        rb.prefixed_message("NOTICE")
            .param("*")
            .trailing_param(lines::CONNECTION_GREETING);
        self.clients[id].send(rb);
        id
    }

    /// Removes the given client from the state, along with its channel memberships.
    ///
    /// Channels left empty are destroyed.  If the client did not quit with QUIT, the members of
    /// its channels are told with `reason`.  Does nothing if the client is already gone.
    pub fn peer_quit(&mut self, id: usize, reason: Option<&str>) {
        let client = match self.clients.try_remove(id) {
            Some(client) => client,
            None => return,
        };
        log::debug!("{}: Disconnected", id);

        if !client.pending_disconnect && !client.channels.is_empty() {
            let mut response = Buffer::new();
            response
                .message(client.full_name(), Command::Quit)
                .trailing_param(reason.unwrap_or(lines::CONNECTION_CLOSED));
            let msg = MessageQueueItem::from(response);
            let mut notified = Vec::new();
            for key in &client.channels {
                if let Some(channel) = self.channels.get(key) {
                    for &member in channel.members.keys() {
                        if member != id && !notified.contains(&member) {
                            notified.push(member);
                            self.send(member, msg.clone());
                        }
                    }
                }
            }
        }

        for key in &client.channels {
            self.leave_channel(id, key);
        }
    }

    /// Removes every client.  Their queues are dropped with them.
    pub fn shutdown(&mut self) {
        let ids: Vec<usize> = self.clients.iter().map(|(id, _)| id).collect();
        for id in ids {
            self.peer_quit(id, Some(lines::SERVER_SHUTDOWN));
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Updates the state according to the given message from the given client.
    ///
    /// Returns `Err(())` when the client has quit and its connection must be closed.
    pub fn handle_message(&mut self, id: usize, msg: Message<'_>) -> Result<(), ()> {
        let client = match self.clients.get(id) {
            Some(client) => client,
            None => return Err(()),
        };
        if msg.is_empty() {
            return Ok(());
        }
        log::trace!("{}: {:?} {:?} {:?}", id, msg.command, msg.params, msg.trailing);

        let mut rb = ReplyBuffer::new(&self.domain, client.nick());
        let command = match Command::parse(msg.command) {
            Some(command) if client.is_registered() || command.is_registration() => command,
            Some(_) => {
                log::debug!(
                    "{}: {} before registration ({:?})",
                    id,
                    msg.command,
                    client.registration_state()
                );
                rb.reply(rpl::ERR_NOTREGISTERED).trailing_param(lines::NOT_REGISTERED);
                client.send(rb);
                return Ok(());
            }
            None => {
                if client.is_registered() {
                    log::debug!("{}: unknown command {:?}", id, msg.command);
                    rb.reply(rpl::ERR_UNKNOWNCOMMAND)
                        .param(msg.command)
                        .trailing_param(lines::UNKNOWN_COMMAND);
                } else {
                    rb.reply(rpl::ERR_NOTREGISTERED).trailing_param(lines::NOT_REGISTERED);
                }
                client.send(rb);
                return Ok(());
            }
        };

        let ctx = CommandContext { id, rb: &mut rb };
        let cmd_result = match command {
            Command::Cap => self.cmd_cap(ctx, msg),
            Command::Invite => self.cmd_invite(ctx, msg),
            Command::Join => self.cmd_join(ctx, msg),
            Command::Kick => self.cmd_kick(ctx, msg),
            Command::Mode => self.cmd_mode(ctx, msg),
            Command::Nick => self.cmd_nick(ctx, msg),
            Command::Part => self.cmd_part(ctx, msg),
            Command::Pass => self.cmd_pass(ctx, msg),
            Command::Ping => self.cmd_ping(ctx, msg),
            Command::Pong => Ok(()),
            Command::PrivMsg => self.cmd_privmsg(ctx, msg),
            Command::Quit => self.cmd_quit(ctx, msg),
            Command::Topic => self.cmd_topic(ctx, msg),
            Command::User => self.cmd_user(ctx, msg),
            Command::Reply(_) => Ok(()),
        };

        if !rb.is_empty() {
            self.send(id, MessageQueueItem::from(rb));
        }

        let client = &mut self.clients[id];
        if cmd_result.is_ok() && client.can_complete_registration() {
            log::info!("{}: Registered as {} ({:?})", id, client.full_name(), client.real());
            client.registration_done = true;
            self.send_welcome(id);
        }

        if self.clients[id].pending_disconnect {
            Err(())
        } else {
            Ok(())
        }
    }

    /// Removes the client from the channel of the given key, and the channel from the registry
    /// if nobody is left.  Nothing is sent.
    fn leave_channel(&mut self, id: usize, key: &str) {
        if let Some(client) = self.clients.get_mut(id) {
            client.channels.remove(key);
        }
        if let Some(channel) = self.channels.get_mut(key) {
            channel.remove_member(id);
            if channel.members.is_empty() {
                log::debug!("{}: {} is now empty", id, channel.name);
                self.channels.remove(key);
            }
        }
    }
}

/// Returns `Ok(channel)` when `name` is an existing channel name.  Otherwise returns `Err(())` and
/// sends an error to the client.
fn find_channel<'a>(
    id: usize,
    rb: &mut ReplyBuffer,
    channels: &'a ChannelMap,
    name: &str,
) -> Result<&'a Channel, ()> {
    match channels.get(channel_key(name)) {
        Some(channel) => Ok(channel),
        None => {
            log::debug!("{}:     no such channel", id);
            rb.reply(rpl::ERR_NOSUCHCHANNEL)
                .param(name)
                .trailing_param(lines::NO_SUCH_CHANNEL);
            Err(())
        }
    }
}

/// Returns `Ok(member_modes)` when the client identified by `id` is in the given `channel`.
/// Otherwise returns `Err(())` and sends an error to the client.
///
/// `channel_name` is needed for the error reply.
fn find_member(
    id: usize,
    rb: &mut ReplyBuffer,
    channel: &Channel,
    channel_name: &str,
) -> Result<MemberModes, ()> {
    match channel.members.get(&id) {
        Some(modes) => Ok(*modes),
        None => {
            log::debug!("{}:     not on channel", id);
            rb.reply(rpl::ERR_NOTONCHANNEL)
                .param(channel_name)
                .trailing_param(lines::NOT_ON_CHANNEL);
            Err(())
        }
    }
}

/// Returns `Ok(target_id)` when a client has taken the nickname `nick`, registered or not.
/// Otherwise returns `Err(())` and sends an error to the client.
fn find_nick(id: usize, rb: &mut ReplyBuffer, clients: &ClientMap, nick: &str) -> Result<usize, ()> {
    match clients
        .iter()
        .find(|(_, client)| client.has_nick && client.nick() == nick)
    {
        Some((target_id, _)) => Ok(target_id),
        None => {
            log::debug!("{}:     nick doesn't exist", id);
            rb.reply(rpl::ERR_NOSUCHNICK)
                .param(nick)
                .trailing_param(lines::NO_SUCH_NICK);
            Err(())
        }
    }
}

/// Sends the replies written so far in `rb` to the client.
///
/// Called before pushing a message that also reaches the client, so that it receives everything
/// in the order the handler produced it.
fn flush_replies(clients: &ClientMap, id: usize, rb: &mut ReplyBuffer) {
    if rb.is_empty() {
        return;
    }
    if let Some(client) = clients.get(id) {
        client.send(rb.take());
    }
}

// Send utilities
impl State {
    /// Sends the given message to the given client.
    fn send(&self, id: usize, msg: MessageQueueItem) {
        if let Some(client) = self.clients.get(id) {
            client.send(msg);
        }
    }

    /// Sends the topic of the channel to the given client, as RPL_TOPIC or RPL_NOTOPIC.
    fn write_topic(rb: &mut ReplyBuffer, channel: &Channel) {
        match channel.topic() {
            Some(topic) => {
                rb.reply(rpl::TOPIC).param(&channel.name).trailing_param(topic);
            }
            None => {
                rb.reply(rpl::NOTOPIC)
                    .param(&channel.name)
                    .trailing_param(lines::NO_TOPIC);
            }
        }
    }

    /// Sends the welcome burst.  Called when a client has completed its registration.
    fn send_welcome(&self, id: usize) {
        let client = &self.clients[id];
        let mut rb = ReplyBuffer::new(&self.domain, client.nick());
        rb.reply(rpl::WELCOME)
            .fmt_trailing_param(lines_welcome!(client.full_name()));
        rb.reply(rpl::YOURHOST)
            .fmt_trailing_param(lines_your_host!(&self.domain, server_version!()));
        rb.reply(rpl::CREATED)
            .fmt_trailing_param(lines_created!(&self.created_at));
        rb.reply(rpl::MYINFO)
            .param(&self.domain)
            .param(server_version!())
            .param(mode::USER_MODES)
            .param(mode::SIMPLE_CHAN_MODES)
            .param(mode::EXTENDED_CHAN_MODES);
        client.send(rb);
    }
}

#[cfg(test)]
mod tests {
    use super::test::*;
    use super::*;

    #[test]
    fn test_is_valid_nickname() {
        for nick in &["bob", "B0b-", "x[]", "a`_^{}\\", "a12345678"] {
            assert!(is_valid_nickname(nick), "{:?}", nick);
        }
        for nick in &["", "1bob", "-bob", "[x]", "a|b", "a123456789", "bo b", "bob!", "*", "é"] {
            assert!(!is_valid_nickname(nick), "{:?}", nick);
        }
    }

    #[test]
    fn test_is_valid_channel_name() {
        for name in &["#town", "&town", "#", "#a-b.c"] {
            assert!(is_valid_channel_name(name), "{:?}", name);
        }
        let too_long = format!("#{}", "a".repeat(MAX_CHANNEL_NAME_LENGTH));
        for name in &["", "town", "#a b", "#a,b", "#a\x07", too_long.as_str()] {
            assert!(!is_valid_channel_name(name), "{:?}", name);
        }
    }

    #[test]
    fn test_channel_key() {
        assert_eq!(channel_key("#town"), "town");
        assert_eq!(channel_key("&town"), "town");
        assert_eq!(channel_key("##town"), "#town");
        assert_eq!(channel_key("town"), "town");
    }

    #[test]
    fn test_greeting() {
        let mut state = simple_state();
        let (_id, mut queue) = add_client(&mut state);

        let mut res = String::new();
        collect(&mut res, &mut queue);
        assert_msgs(
            &res,
            &[(Some("ircserv.test"), "NOTICE", &["*", lines::CONNECTION_GREETING])],
        );
    }

    #[test]
    fn test_welcome_burst() {
        let mut state = simple_state();
        let (id, mut queue) = add_client(&mut state);
        flush(&mut queue);

        handle_message(&mut state, id, "NICK bob");
        handle_message(&mut state, id, "USER bobby 0 * :Bob B.");

        let mut res = String::new();
        collect(&mut res, &mut queue);
        assert_msgs(
            &res,
            &[
                (Some("*!@127.0.0.1"), "NICK", &["bob"]),
                (
                    Some("ircserv.test"),
                    "001",
                    &["bob", "Welcome to the Internet Relay Network bob!bobby@127.0.0.1"],
                ),
                (Some("ircserv.test"), "002", &["bob", ""]),
                (Some("ircserv.test"), "003", &["bob", ""]),
                (
                    Some("ircserv.test"),
                    "004",
                    &["bob", "ircserv.test", server_version!(), "io", "it", "bklo"],
                ),
            ],
        );
        assert!(state.clients[id].is_registered());
    }

    #[test]
    fn test_commands_before_registration() {
        let mut state = simple_state();
        let (id, mut queue) = add_client(&mut state);
        flush(&mut queue);

        handle_message(&mut state, id, "JOIN #town");
        handle_message(&mut state, id, "FOO bar");
        handle_message(&mut state, id, "join #town");

        let mut res = String::new();
        collect(&mut res, &mut queue);
        assert_msgs(
            &res,
            &[
                (Some("ircserv.test"), "451", &["*", lines::NOT_REGISTERED]),
                (Some("ircserv.test"), "451", &["*", lines::NOT_REGISTERED]),
                (Some("ircserv.test"), "451", &["*", lines::NOT_REGISTERED]),
            ],
        );
        assert_eq!(state.channel_count(), 0);
    }

    #[test]
    fn test_unknown_command() {
        let mut state = simple_state();
        let (id, mut queue) = add_registered_client(&mut state, "bob");
        flush(&mut queue);

        handle_message(&mut state, id, "WHOIS bob");
        handle_message(&mut state, id, "privmsg bob :hi");
        handle_message(&mut state, id, "");
        handle_message(&mut state, id, ":prefix");

        let mut res = String::new();
        collect(&mut res, &mut queue);
        assert_msgs(
            &res,
            &[
                (Some("ircserv.test"), "421", &["bob", "WHOIS", lines::UNKNOWN_COMMAND]),
                (Some("ircserv.test"), "421", &["bob", "privmsg", lines::UNKNOWN_COMMAND]),
            ],
        );
    }

    #[test]
    fn test_password() {
        let mut state = State::new(config::State {
            password: String::from("secret"),
            ..config::State::sample()
        });
        let (id, mut queue) = add_client(&mut state);
        flush(&mut queue);

        handle_message(&mut state, id, "NICK bob");
        handle_message(&mut state, id, "PASS wrong");
        handle_message(&mut state, id, "PASS");
        handle_message(&mut state, id, "PASS :secret");
        handle_message(&mut state, id, "PASS wrong");
        handle_message(&mut state, id, "NICK bob");
        handle_message(&mut state, id, "USER bobby 0 * :Bob");
        handle_message(&mut state, id, "PASS secret");

        let mut res = String::new();
        collect(&mut res, &mut queue);
        assert_msgs(
            &res,
            &[
                (Some("ircserv.test"), "451", &["*", lines::NOT_REGISTERED]),
                (Some("ircserv.test"), "464", &["*", lines::PASSWORD_MISMATCH]),
                (Some("ircserv.test"), "461", &["*", "PASS", lines::NEED_MORE_PARAMS]),
                (Some("*!@127.0.0.1"), "NICK", &["bob"]),
                (Some("ircserv.test"), "001", &["bob", ""]),
                (Some("ircserv.test"), "002", &["bob", ""]),
                (Some("ircserv.test"), "003", &["bob", ""]),
                (Some("ircserv.test"), "004", &["bob", "", "", "", "", ""]),
                (Some("ircserv.test"), "462", &["bob", lines::ALREADY_REGISTERED]),
            ],
        );
    }

    #[test]
    fn test_registration_needs_nick_and_user() {
        let mut state = simple_state();
        let (id, mut queue) = add_client(&mut state);
        flush(&mut queue);

        handle_message(&mut state, id, "USER bobby 0 *");
        handle_message(&mut state, id, "USER bobby 0 * :Bob");
        assert!(!state.clients[id].is_registered());
        handle_message(&mut state, id, "NICK :bob");
        assert!(state.clients[id].is_registered());
        assert_eq!(state.clients[id].full_name(), "bob!bobby@127.0.0.1");

        flush(&mut queue);
        handle_message(&mut state, id, "USER again 0 * :Again");
        let mut res = String::new();
        collect(&mut res, &mut queue);
        assert_msgs(
            &res,
            &[(Some("ircserv.test"), "462", &["bob", lines::ALREADY_REGISTERED])],
        );
    }

    #[test]
    fn test_peer_quit() {
        let mut state = simple_state();
        let (alice, mut alice_queue) = add_registered_client(&mut state, "alice");
        let (bob, _bob_queue) = add_registered_client(&mut state, "bob");
        handle_message(&mut state, alice, "JOIN #town,#hall");
        handle_message(&mut state, bob, "JOIN #town");
        flush(&mut alice_queue);

        state.peer_quit(bob, Some("Connection reset"));
        state.peer_quit(bob, None);

        let mut res = String::new();
        collect(&mut res, &mut alice_queue);
        assert_msgs(
            &res,
            &[(Some("bob!X@127.0.0.1"), "QUIT", &["Connection reset"])],
        );
        assert_eq!(state.client_count(), 1);
        assert_eq!(state.channels["town"].members.len(), 1);

        state.peer_quit(alice, None);
        assert_eq!(state.client_count(), 0);
        assert_eq!(state.channel_count(), 0);
    }

    #[test]
    fn test_shutdown() {
        let mut state = simple_state();
        let (alice, mut alice_queue) = add_registered_client(&mut state, "alice");
        let (_bob, _) = add_registered_client(&mut state, "bob");
        handle_message(&mut state, alice, "JOIN #town");

        state.shutdown();
        assert_eq!(state.client_count(), 0);
        assert_eq!(state.channel_count(), 0);

        flush(&mut alice_queue);
        assert!(matches!(
            alice_queue.try_recv(),
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
