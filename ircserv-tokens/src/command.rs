use std::fmt;

macro_rules! commands {
    ( $( $cmd:ident $cmd_str:literal )* ) => {
        /// The commands ircserv knows about.
        ///
        /// Numeric replies and other outgoing-only commands are represented by
        /// `Command::Reply`.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Command {
            $( $cmd, )*
            Reply(&'static str),
        }

        impl Command {
            /// From a given command string, returns the corresponding command, or `None`
            /// otherwise.
            ///
            /// The lookup is case-sensitive.
            ///
            /// # Example
            ///
            /// ```rust
            /// # use ircserv_tokens::Command;
            /// assert_eq!(Command::parse("JOIN"), Some(Command::Join));
            /// assert_eq!(Command::parse("join"), None);
            /// assert_eq!(Command::parse("WHOIS"), None);
            /// ```
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                $(
                    $cmd_str => Some(Command::$cmd),
                )*
                    _ => None,
                }
            }

            /// Returns the command string.
            ///
            /// # Example
            ///
            /// ```rust
            /// # use ircserv_tokens::Command;
            /// assert_eq!(Command::PrivMsg.as_str(), "PRIVMSG");
            /// assert_eq!(Command::Reply("001").as_str(), "001");
            /// ```
            pub fn as_str(&self) -> &'static str {
                match self {
                $(
                    Command::$cmd => $cmd_str,
                )*
                    Command::Reply(s) => s,
                }
            }
        }

        impl From<&'static str> for Command {
            /// `&'static str`s are converted to the `Command::Reply` variant.
            ///
            /// This lets `Buffer` accept both commands and numeric replies.
            fn from(reply: &'static str) -> Self {
                Command::Reply(reply)
            }
        }

        impl fmt::Display for Command {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.as_str().fmt(f)
            }
        }
    }
}

commands! {
    Cap      "CAP"
    Invite   "INVITE"
    Join     "JOIN"
    Kick     "KICK"
    Mode     "MODE"
    Nick     "NICK"
    Part     "PART"
    Pass     "PASS"
    Ping     "PING"
    Pong     "PONG"
    PrivMsg  "PRIVMSG"
    Quit     "QUIT"
    Topic    "TOPIC"
    User     "USER"
}

impl Command {
    /// Whether the command may be issued before registration is complete.
    pub fn is_registration(self) -> bool {
        matches!(self, Command::Cap | Command::Nick | Command::Pass | Command::User)
    }
}
