/// The recommended length of a message.
///
/// `Message::parse` accepts longer lines.  `Buffer` reserves this much space for every message it
/// builds to avoid reallocating on each parameter.
pub const MESSAGE_LENGTH: usize = 512;

/// If the line starts with a prefix, returns `(Some(prefix), rest)` where `rest` starts right
/// after the first space.  A line made only of a prefix leaves an empty `rest`.
fn parse_prefix(buf: &str) -> (Option<&str>, &str) {
    match buf.strip_prefix(':') {
        Some(rest) => match rest.find(' ') {
            Some(i) => (Some(&rest[..i]), &rest[i + 1..]),
            None => (Some(rest), ""),
        },
        None => (None, buf),
    }
}

/// Splits the line at the first `" :"`.  Everything after the marker is the trailing argument,
/// taken verbatim.
fn parse_trailing(buf: &str) -> (&str, Option<&str>) {
    match buf.find(" :") {
        Some(i) => (&buf[..i], Some(&buf[i + 2..])),
        None => (buf, None),
    }
}

/// A line received from a client.
///
/// Borrows from the line it was parsed from.  See `Message::parse` for the grammar.
#[derive(Clone, Debug, PartialEq)]
pub struct Message<'a> {
    /// The prefix of the message, without its colon.  Servers ignore it.
    pub prefix: Option<&'a str>,

    /// The command, exactly as the client sent it.  Empty for blank lines.
    pub command: &'a str,

    /// The middle parameters, in order.
    pub params: Vec<&'a str>,

    /// The trailing argument: `None` when the line has no `" :"`, `Some("")` when the marker
    /// ends the line.
    pub trailing: Option<&'a str>,
}

impl<'a> Message<'a> {
    /// Parses a line.  The line terminator must have been stripped already.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ircserv_tokens::Message;
    /// let privmsg = Message::parse(":ser PRIVMSG #hall bob :I'm   Simon Sir");
    ///
    /// assert_eq!(privmsg.prefix, Some("ser"));
    /// assert_eq!(privmsg.command, "PRIVMSG");
    /// assert_eq!(privmsg.params, vec!["#hall", "bob"]);
    /// assert_eq!(privmsg.trailing, Some("I'm   Simon Sir"));
    /// ```
    ///
    /// Blank lines and lines that only carry a prefix have an empty command:
    ///
    /// ```rust
    /// # use ircserv_tokens::Message;
    /// assert!(Message::parse("").is_empty());
    /// assert!(Message::parse(":prefix").is_empty());
    /// ```
    pub fn parse(line: &'a str) -> Message<'a> {
        let (prefix, rest) = parse_prefix(line);
        let (head, trailing) = parse_trailing(rest);
        let mut words = head.split_whitespace();
        let command = words.next().unwrap_or("");
        let params = words.collect();

        Message {
            prefix,
            command,
            params,
            trailing,
        }
    }

    /// Whether the line had no command.  Such lines are ignored.
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }

    /// The parameter at index `i`.
    pub fn param(&self, i: usize) -> Option<&'a str> {
        self.params.get(i).copied()
    }

    /// The trailing argument, or an empty string if there is none.
    pub fn trailing_or_empty(&self) -> &'a str {
        self.trailing.unwrap_or("")
    }

    /// Moves a non-empty trailing argument at the end of the parameters.
    ///
    /// Several commands accept their last argument either way (`NICK bob` and `NICK :bob`).
    ///
    /// # Example
    ///
    /// ```rust
    /// # use ircserv_tokens::Message;
    /// let mut join = Message::parse("JOIN :#hall");
    /// join.promote_trailing();
    ///
    /// assert_eq!(join.params, vec!["#hall"]);
    /// assert_eq!(join.trailing, None);
    /// ```
    pub fn promote_trailing(&mut self) {
        match self.trailing {
            Some(trailing) if !trailing.is_empty() => {
                self.params.push(trailing);
                self.trailing = None;
            }
            _ => {}
        }
    }

    /// All arguments: the middle parameters followed by the trailing one, if present.
    pub fn arguments(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.params.iter().copied().chain(self.trailing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_only() {
        let msg = Message::parse("QUIT");
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.command, "QUIT");
        assert!(msg.params.is_empty());
        assert_eq!(msg.trailing, None);
    }

    #[test]
    fn test_parse_prefix_is_dropped() {
        let msg = Message::parse(":nick!user@host JOIN #a,#b key");
        assert_eq!(msg.prefix, Some("nick!user@host"));
        assert_eq!(msg.command, "JOIN");
        assert_eq!(msg.params, vec!["#a,#b", "key"]);
        assert_eq!(msg.trailing, None);

        let msg = Message::parse(":only-a-prefix");
        assert_eq!(msg.prefix, Some("only-a-prefix"));
        assert!(msg.is_empty());
    }

    #[test]
    fn test_parse_whitespace_runs() {
        let msg = Message::parse("MODE   #town  +l    2 ");
        assert_eq!(msg.command, "MODE");
        assert_eq!(msg.params, vec!["#town", "+l", "2"]);

        let msg = Message::parse("   ");
        assert!(msg.is_empty());
        assert!(msg.params.is_empty());
    }

    #[test]
    fn test_parse_trailing() {
        let msg = Message::parse("USER u 0 * :Bob the :builder");
        assert_eq!(msg.params, vec!["u", "0", "*"]);
        assert_eq!(msg.trailing, Some("Bob the :builder"));

        let msg = Message::parse("TOPIC #town :");
        assert_eq!(msg.params, vec!["#town"]);
        assert_eq!(msg.trailing, Some(""));
        assert_eq!(msg.trailing_or_empty(), "");

        let msg = Message::parse("NICK :bob");
        assert!(msg.params.is_empty());
        assert_eq!(msg.trailing, Some("bob"));

        // A colon inside a word does not start the trailing argument.
        let msg = Message::parse("PASS a:b");
        assert_eq!(msg.params, vec!["a:b"]);
        assert_eq!(msg.trailing, None);
    }

    #[test]
    fn test_parse_empty() {
        let msg = Message::parse("");
        assert!(msg.is_empty());
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.trailing, None);
    }

    #[test]
    fn test_promote_trailing() {
        let mut msg = Message::parse("PING :");
        msg.promote_trailing();
        assert!(msg.params.is_empty());
        assert_eq!(msg.trailing, Some(""));

        let mut msg = Message::parse("PART #a :see you");
        msg.promote_trailing();
        assert_eq!(msg.params, vec!["#a", "see you"]);
        assert_eq!(msg.param(1), Some("see you"));
        assert_eq!(msg.param(2), None);
    }

    #[test]
    fn test_arguments() {
        let msg = Message::parse("KICK #a bob :bye bye");
        let args: Vec<_> = msg.arguments().collect();
        assert_eq!(args, vec!["#a", "bob", "bye bye"]);
    }
} // mod tests
