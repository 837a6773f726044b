use crate::{Command, MESSAGE_LENGTH};
use std::cell::RefCell;
use std::fmt;
use std::mem;

/// Helper to build an IRC message.
///
/// Use with `Buffer::message` and `ReplyBuffer::message`.  The line terminator is appended
/// when the `MessageBuffer` is dropped.
pub struct MessageBuffer<'a> {
    buf: &'a mut String,
}

impl<'a> MessageBuffer<'a> {
    fn with_prefix<C>(buf: &'a mut String, prefix: &str, command: C) -> Self
    where
        C: Into<Command>,
    {
        if !prefix.is_empty() {
            buf.push(':');
            buf.push_str(prefix);
            buf.push(' ');
        }
        buf.push_str(command.into().as_str());
        MessageBuffer { buf }
    }

    /// Appends a parameter to the message.
    ///
    /// The parameter is trimmed before insertion.  If `param` is whitespace, it is not appended.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ircserv_tokens::{Command, Buffer};
    /// let mut response = Buffer::new();
    ///
    /// response.message("nick!user@127.0.0.1", Command::Invite)
    ///     .param("")
    ///     .param("  bob ")
    ///     .param("#hall");
    ///
    /// assert_eq!(&response.build(), ":nick!user@127.0.0.1 INVITE bob #hall\r\n");
    /// ```
    pub fn param(self, param: &str) -> Self {
        let param = param.trim();
        if param.is_empty() {
            return self;
        }
        self.buf.push(' ');
        self.buf.push_str(param);
        self
    }

    /// Formats, then appends a parameter to the message.
    ///
    /// The parameter is **NOT** trimmed, and is appended even if it's empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ircserv_tokens::{Buffer, rpl};
    /// let mut response = Buffer::new();
    ///
    /// response.message("irc.local", rpl::CHANNELMODEIS)
    ///     .param("bob")
    ///     .fmt_param(format_args!("#{}", "hall"))
    ///     .fmt_param(42);
    ///
    /// assert_eq!(&response.build(), ":irc.local 324 bob #hall 42\r\n");
    /// ```
    pub fn fmt_param<T>(self, param: T) -> Self
    where
        T: fmt::Display,
    {
        use std::fmt::Write as _;

        self.buf.push(' ');
        let _ = write!(self.buf, "{}", param);
        self
    }

    /// Appends the trailing parameter to the message and consumes the buffer.
    ///
    /// The parameter is not trimmed, and is appended even if it is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ircserv_tokens::{Command, Buffer};
    /// let mut response = Buffer::new();
    ///
    /// response.message("nick!user@127.0.0.1", Command::Quit)
    ///     .trailing_param("long quit message");
    ///
    /// assert_eq!(&response.build(), ":nick!user@127.0.0.1 QUIT :long quit message\r\n");
    /// ```
    pub fn trailing_param(self, param: &str) {
        self.buf.push(' ');
        self.buf.push(':');
        self.buf.push_str(param);
    }

    /// Formats, then appends the trailing parameter to the message and consumes the buffer.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ircserv_tokens::{Buffer, rpl};
    /// let mut response = Buffer::new();
    ///
    /// response.message("irc.local", rpl::CREATED)
    ///     .param("bob")
    ///     .fmt_trailing_param(format_args!("Up since {}", "yesterday"));
    ///
    /// assert_eq!(&response.build(), ":irc.local 003 bob :Up since yesterday\r\n");
    /// ```
    pub fn fmt_trailing_param<T>(mut self, param: T)
    where
        T: fmt::Display,
    {
        use std::fmt::Write as _;

        let _ = write!(self.raw_trailing_param(), "{}", param);
    }

    /// Returns a buffer the caller can use to append characters to an IRC message.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ircserv_tokens::{Command, Buffer};
    /// let mut response = Buffer::new();
    /// {
    ///     let mut msg = response.message("nick!user@127.0.0.1", Command::Mode)
    ///         .param("#my_channel");
    ///     let param = msg.raw_param();
    ///     param.push('+');
    ///     param.push('i');
    ///     param.push('t');
    /// }
    ///
    /// assert_eq!(&response.build(), ":nick!user@127.0.0.1 MODE #my_channel +it\r\n");
    /// ```
    pub fn raw_param(&mut self) -> &mut String {
        self.buf.push(' ');
        self.buf
    }

    /// Returns a buffer the caller can use to append characters to the trailing parameter.
    pub fn raw_trailing_param(&mut self) -> &mut String {
        self.buf.push(' ');
        self.buf.push(':');
        self.buf
    }
}

impl Drop for MessageBuffer<'_> {
    /// Append "\r\n" when the message is complete.
    fn drop(&mut self) {
        self.buf.push('\r');
        self.buf.push('\n');
    }
}

/// Helper to build IRC messages.
///
/// If you mainly need to send replies, `ReplyBuffer` might be a better fit.
///
/// # Example
///
/// ```rust
/// # use ircserv_tokens::{Command, Buffer, rpl};
/// let mut response = Buffer::new();
///
/// response.message("nick!user@127.0.0.1", Command::Topic)
///     .param("#hall")
///     .trailing_param("Welcome to new users!");
/// response.message("irc.local", rpl::TOPIC)
///     .param("nickname")
///     .param("#hall")
///     .trailing_param("Welcome to new users!");
///
/// let result = response.build();
/// assert_eq!(&result, ":nick!user@127.0.0.1 TOPIC #hall :Welcome to new users!\r\n\
/// :irc.local 332 nickname #hall :Welcome to new users!\r\n");
/// ```
#[derive(Debug, Default)]
pub struct Buffer {
    buf: String,
}

impl Buffer {
    /// Creates a `Buffer`.  Does not allocate.
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Appends an IRC message with a prefix to the buffer.
    ///
    /// If `prefix` is empty, no prefix is written.  This function may allocate to reserve space
    /// for the message.
    pub fn message<C>(&mut self, prefix: &str, command: C) -> MessageBuffer<'_>
    where
        C: Into<Command>,
    {
        self.buf.reserve(MESSAGE_LENGTH);
        MessageBuffer::with_prefix(&mut self.buf, prefix, command)
    }

    /// Consumes the `Buffer` and returns the underlying `String`.
    pub fn build(self) -> String {
        self.buf
    }
}

thread_local! {
    static DOMAIN: RefCell<String> = RefCell::new(String::new());
    static NICKNAME: RefCell<String> = RefCell::new(String::new());
}

/// A helper to build responses meant for one client.
///
/// Replies have the domain of the server as prefix and the nickname of the client as first
/// parameter.  `ReplyBuffer` fills both in.
///
/// # Example
///
/// ```rust
/// # use ircserv_tokens::{Command, ReplyBuffer, rpl};
/// let mut response = ReplyBuffer::new("irc.local", "nickname");
///
/// response.message("nick!user@127.0.0.1", Command::Topic)
///     .param("#hall")
///     .trailing_param("Welcome to new users!");
/// response.reply(rpl::TOPIC)
///     .param("#hall")
///     .trailing_param("Welcome to new users!");
///
/// assert_eq!(&response.build(), ":nick!user@127.0.0.1 TOPIC #hall :Welcome to new users!\r\n\
/// :irc.local 332 nickname #hall :Welcome to new users!\r\n");
/// ```
///
/// # Usage note
///
/// The domain and the nickname live in thread-local storage, so that the buffer does not borrow
/// the server state while handlers mutate it.  Do not use two `ReplyBuffer`s at the same time on
/// the same thread, otherwise nicknames and domains will be mixed.
#[derive(Debug)]
pub struct ReplyBuffer {
    buf: Buffer,
}

impl ReplyBuffer {
    /// Creates a new `ReplyBuffer` and initializes the thread-local domain and nickname.
    pub fn new(domain: &str, nickname: &str) -> Self {
        DOMAIN.with(|s| {
            let mut s = s.borrow_mut();
            s.clear();
            s.push_str(domain);
        });
        let mut res = Self { buf: Buffer::new() };
        res.set_nick(nickname);
        res
    }

    /// Whether the buffer has messages in it or not.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ircserv_tokens::{ReplyBuffer, rpl};
    /// let empty = ReplyBuffer::new("irc.local", "ser");
    /// assert!(empty.is_empty());
    ///
    /// let mut not_empty = ReplyBuffer::new("irc.local", "ser");
    /// not_empty.reply(rpl::ERR_NOTREGISTERED);
    /// assert!(!not_empty.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Takes the messages written so far, and leaves the buffer empty.
    ///
    /// The domain and the nickname are kept for the following replies.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ircserv_tokens::{ReplyBuffer, rpl};
    /// let mut response = ReplyBuffer::new("irc.local", "ser");
    ///
    /// response.reply(rpl::ERR_NOTREGISTERED);
    /// assert_eq!(&response.take(), ":irc.local 451 ser\r\n");
    /// assert!(response.is_empty());
    ///
    /// response.reply(rpl::ERR_NOTREGISTERED);
    /// assert_eq!(&response.build(), ":irc.local 451 ser\r\n");
    /// ```
    pub fn take(&mut self) -> String {
        mem::take(&mut self.buf).build()
    }

    /// Changes the nickname used by subsequent replies.
    pub fn set_nick(&mut self, nickname: &str) {
        NICKNAME.with(|n| {
            let mut n = n.borrow_mut();
            n.clear();
            n.push_str(nickname);
        });
    }

    /// Appends a reply to the buffer.
    ///
    /// This pushes the domain, the reply and the nickname of the client, and then returns the
    /// resulting `MessageBuffer`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ircserv_tokens::{ReplyBuffer, rpl};
    /// let mut response = ReplyBuffer::new("irc.local", "ser");
    ///
    /// response.reply(rpl::WELCOME).trailing_param("Welcome to IRC, ser");
    ///
    /// assert_eq!(&response.build(), ":irc.local 001 ser :Welcome to IRC, ser\r\n");
    /// ```
    pub fn reply<C>(&mut self, r: C) -> MessageBuffer<'_>
    where
        C: Into<Command>,
    {
        let msg = self.prefixed_message(r);
        NICKNAME.with(|s| msg.fmt_param(&s.borrow()))
    }

    /// Appends a command with the domain prefix, but without the nickname parameter.
    pub fn prefixed_message<C>(&mut self, command: C) -> MessageBuffer<'_>
    where
        C: Into<Command>,
    {
        DOMAIN.with(move |s| self.buf.message(&s.borrow(), command))
    }

    /// Appends a message like you would do with a `Buffer`.
    pub fn message<C>(&mut self, prefix: &str, command: C) -> MessageBuffer<'_>
    where
        C: Into<Command>,
    {
        self.buf.message(prefix, command)
    }

    /// Consumes the buffer and returns the underlying `String`.
    pub fn build(self) -> String {
        self.buf.build()
    }
}
