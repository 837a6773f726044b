use ircserv_tokens::{Buffer, ReplyBuffer};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A message ready to be written on a connection.
///
/// Cloning is cheap, so that one message can be pushed to every member of a channel.
#[derive(Clone, Debug)]
pub struct MessageQueueItem(Arc<str>);

impl From<String> for MessageQueueItem {
    fn from(val: String) -> Self {
        Self(Arc::from(val))
    }
}

impl From<Buffer> for MessageQueueItem {
    fn from(val: Buffer) -> Self {
        Self::from(val.build())
    }
}

impl From<ReplyBuffer> for MessageQueueItem {
    fn from(val: ReplyBuffer) -> Self {
        Self::from(val.build())
    }
}

impl AsRef<str> for MessageQueueItem {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for MessageQueueItem {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// The write end of the queue of messages to be sent to a client.
///
/// It is unbounded, so pushing messages never blocks.  The reactor owns the read end and drains
/// it into the outbound buffer of the connection.
pub type MessageQueue = mpsc::UnboundedSender<MessageQueueItem>;

/// How far a client has gone through the PASS/NICK/USER handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationState {
    /// The client must send the connection password.
    New,

    /// The password has been accepted (or none is required).
    PassAccepted,

    /// The client has given a nickname or a username, but not both yet.
    Identified,

    /// The welcome burst has been sent.  Terminal for the lifetime of the connection.
    Registered,
}

/// Client data.
pub struct Client {
    /// The queue of messages to be sent to the client.
    queue: MessageQueue,

    /// The IP address of the peer, used as the host part of `full_name`.
    host: String,

    nick: String,
    user: String,
    real: String,

    /// `nick!user@host`, used as prefix for messages relayed on behalf of this client.
    full_name: String,

    /// User mode `i`.
    pub invisible: bool,

    /// User mode `o`.  Can be removed by the client, never granted through MODE.
    pub operator: bool,

    /// The names of the channels the client is in (registry keys).
    pub channels: BTreeSet<String>,

    pub pass_ok: bool,
    pub has_nick: bool,
    pub has_user: bool,
    pub registration_done: bool,

    /// Set by QUIT.  The reactor tears the connection down once the command has been handled.
    pub pending_disconnect: bool,
}

impl Client {
    /// Initialize the data for a new client, given its message queue and address.
    ///
    /// The nickname is set to "*" until the client sends NICK.  `pass_ok` should be true when
    /// the server does not require a password.
    pub fn new(queue: MessageQueue, host: String, pass_ok: bool) -> Self {
        let mut res = Self {
            queue,
            host,
            nick: String::from("*"),
            user: String::new(),
            real: String::new(),
            full_name: String::new(),
            invisible: false,
            operator: false,
            channels: BTreeSet::new(),
            pass_ok,
            has_nick: false,
            has_user: false,
            registration_done: false,
            pending_disconnect: false,
        };
        res.update_full_name();
        res
    }

    /// Add a message to the client message queue.
    ///
    /// Use this function to send messages to the client.
    pub fn send<M>(&self, msg: M)
    where
        M: Into<MessageQueueItem>,
    {
        // The receiver is only gone while the connection is being torn down.
        let _ = self.queue.send(msg.into());
    }

    pub fn registration_state(&self) -> RegistrationState {
        if self.registration_done {
            RegistrationState::Registered
        } else if self.has_nick || self.has_user {
            RegistrationState::Identified
        } else if self.pass_ok {
            RegistrationState::PassAccepted
        } else {
            RegistrationState::New
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registration_done
    }

    /// Whether the welcome burst is due: everything has been given, and the burst has not been
    /// sent yet.
    pub fn can_complete_registration(&self) -> bool {
        self.pass_ok && self.has_nick && self.has_user && !self.registration_done
    }

    /// The nickname of the client.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn real(&self) -> &str {
        &self.real
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Change the nickname of the client.
    pub fn set_nick(&mut self, nick: &str) {
        self.nick.clear();
        self.nick.push_str(nick);
        self.update_full_name();
    }

    /// Change the username and the realname of the client.
    pub fn set_user_real(&mut self, user: &str, real: &str) {
        self.user.clear();
        self.user.push_str(user);
        self.real.clear();
        self.real.push_str(real);
        self.update_full_name();
    }

    /// The user modes as sent in RPL_UMODEIS, e.g. "+io".
    pub fn modes(&self) -> String {
        let mut modes = String::from("+");
        if self.invisible {
            modes.push('i');
        }
        if self.operator {
            modes.push('o');
        }
        modes
    }

    fn update_full_name(&mut self) {
        self.full_name.clear();
        self.full_name.push_str(&self.nick);
        self.full_name.push('!');
        self.full_name.push_str(&self.user);
        self.full_name.push('@');
        self.full_name.push_str(&self.host);
    }
}
