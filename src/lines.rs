//
// Network messages
//

pub const CONNECTION_GREETING: &str =
    "Hi there! Register with PASS, NICK and USER, then join a channel to start chatting";

pub const CLIENT_QUIT: &str = "Client Quit";

pub const CONNECTION_CLOSED: &str = "Connection closed";

pub const SERVER_SHUTDOWN: &str = "Server shutting down";

//
// IRC replies
//

pub const ALREADY_REGISTERED: &str = "You are already registered";

pub const BAD_CHAN_KEY: &str = "Cannot join channel (wrong key)";

pub const BANNED_FROM_CHAN: &str = "Cannot join channel (you are banned)";

pub const CHAN_O_PRIVS_NEEDED: &str = "You need to be a channel operator for that";

pub const CHANNEL_IS_FULL: &str = "Cannot join channel (channel is full)";

pub const ERRONEOUS_NICKNAME: &str = "Erroneous nickname";

pub const INVALID_LIMIT: &str = "The limit must be a non-negative integer";

pub const INVITE_ONLY_CHAN: &str = "Cannot join channel (invite only)";

pub const NEED_MORE_PARAMS: &str = "Not enough parameters";

pub const NICKNAME_IN_USE: &str = "Nickname is already in use";

pub const NO_NICKNAME_GIVEN: &str = "No nickname given";

pub const NO_SUCH_CHANNEL: &str = "No such channel";

pub const NO_SUCH_NICK: &str = "No such nick";

pub const NO_TOPIC: &str = "No topic is set";

pub const NOT_ON_CHANNEL: &str = "You are not on that channel";

pub const NOT_REGISTERED: &str = "You have not registered";

pub const PASSWORD_MISMATCH: &str = "Password incorrect";

pub const UNKNOWN_COMMAND: &str = "Unknown command";

pub const UNKNOWN_MODE: &str = "is an unknown mode character";

pub const UMODE_UNKNOWN_FLAG: &str = "Unknown MODE flag";

pub const USER_NOT_IN_CHANNEL: &str = "They aren't on that channel";

pub const USER_ON_CHANNEL: &str = "is already on channel";

pub const USERS_DONT_MATCH: &str = "Can't change mode for other users";

#[macro_export]
macro_rules! lines_your_host {
    ( $domain:expr, $version:expr ) => {
        format_args!("Your host is {}, running version {}", $domain, $version)
    };
}

#[macro_export]
macro_rules! lines_created {
    ( $since:expr ) => {
        format_args!("This server was created {}", $since)
    };
}

#[macro_export]
macro_rules! lines_welcome {
    ( $name:expr ) => {
        format_args!("Welcome to the Internet Relay Network {}", $name)
    };
}
