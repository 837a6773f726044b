//! Mode parsing and validation

use std::str;

/// User modes supported by ircserv.  Advertised in welcome messages.
pub const USER_MODES: &str = "io";

/// Channel modes that have no parameters.  Advertised in welcome messages.
pub const SIMPLE_CHAN_MODES: &str = "it";

/// Channel modes that take a parameter when set.  Advertised in welcome messages.
pub const EXTENDED_CHAN_MODES: &str = "bklo";

/// Iterator over the modes of a string.
///
/// Letters before the first sign are treated as additions.
struct SimpleQuery<'a> {
    modes: str::Chars<'a>,
    value: bool,
}

impl<'a> SimpleQuery<'a> {
    pub fn new(modes: &'a str) -> Self {
        Self {
            modes: modes.chars(),
            value: true,
        }
    }
}

impl Iterator for SimpleQuery<'_> {
    type Item = (bool, char);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.modes.next()? {
                '+' => self.value = true,
                '-' => self.value = false,
                c => return Some((self.value, c)),
            }
        }
    }
}

/// Whether the mode string starts with a sign.  Other strings are rejected by MODE.
///
/// # Example
///
/// ```rust
/// # use ircserv_tokens::mode;
/// assert!(mode::is_signed("+it"));
/// assert!(mode::is_signed("-l"));
/// assert!(!mode::is_signed("i"));
/// assert!(!mode::is_signed(""));
/// ```
pub fn is_signed(modes: &str) -> bool {
    modes.starts_with('+') || modes.starts_with('-')
}

/// *_query related errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// One of the modes in the query is unknown.
    Unknown(char, bool),

    /// A mode is missing its required parameter.
    MissingParam(char, bool),

    /// This mode exists, but cannot be changed this way with the MODE command.
    Unchangeable(char, bool),
}

/// Alias to std's Result using this module's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Item of a user mode query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserChange {
    Invisible(bool),
    DeOperator,
}

impl UserChange {
    /// Whether this change is enabling or disabling a mode.
    pub fn value(self) -> bool {
        match self {
            Self::Invisible(v) => v,
            Self::DeOperator => false,
        }
    }

    /// The letter of this mode change.
    pub fn symbol(self) -> char {
        match self {
            Self::Invisible(_) => 'i',
            Self::DeOperator => 'o',
        }
    }
}

/// An iterator over the changes of a user MODE query.
///
/// Clients cannot give themselves operator status.
///
/// # Example
///
/// ```rust
/// # use ircserv_tokens::mode::{self, Error, UserChange};
/// let mut query = mode::user_query("+io-oX");
///
/// assert_eq!(query.next(), Some(Ok(UserChange::Invisible(true))));
/// assert_eq!(query.next(), Some(Err(Error::Unchangeable('o', true))));
/// assert_eq!(query.next(), Some(Ok(UserChange::DeOperator)));
/// assert_eq!(query.next(), Some(Err(Error::Unknown('X', false))));
/// assert_eq!(query.next(), None);
/// ```
pub fn user_query(modes: &str) -> impl Iterator<Item = Result<UserChange>> + '_ {
    SimpleQuery::new(modes).map(|(value, mode)| match mode {
        'i' => Ok(UserChange::Invisible(value)),
        'o' if !value => Ok(UserChange::DeOperator),
        other if USER_MODES.contains(other) => Err(Error::Unchangeable(other, value)),
        other => Err(Error::Unknown(other, value)),
    })
}

/// Item of a channel mode query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelChange<'a> {
    InviteOnly(bool),
    TopicRestricted(bool),
    Key(Option<&'a str>),
    UserLimit(Option<&'a str>),
    ChangeBan(bool, &'a str),
    ChangeOperator(bool, &'a str),
}

impl ChannelChange<'_> {
    /// Whether this change is enabling or disabling a mode.
    pub fn value(&self) -> bool {
        use ChannelChange::*;
        match self {
            InviteOnly(v) | TopicRestricted(v) | ChangeBan(v, _) | ChangeOperator(v, _) => *v,
            Key(k) => k.is_some(),
            UserLimit(l) => l.is_some(),
        }
    }

    /// The letter of this mode change.
    pub fn symbol(&self) -> char {
        use ChannelChange::*;
        match self {
            InviteOnly(_) => 'i',
            TopicRestricted(_) => 't',
            Key(_) => 'k',
            UserLimit(_) => 'l',
            ChangeBan(_, _) => 'b',
            ChangeOperator(_, _) => 'o',
        }
    }

    /// The parameter of this mode change.
    pub fn param(&self) -> Option<&str> {
        use ChannelChange::*;
        match self {
            ChangeBan(_, p) | ChangeOperator(_, p) => Some(p),
            Key(p) | UserLimit(p) => *p,
            _ => None,
        }
    }
}

/// An iterator over the changes of a channel MODE query.
///
/// Parameters are consumed in order by the letters that need one: `+k`, `+l`, `b` and `o`.
/// `-k` and `-l` take none.
///
/// # Example
///
/// ```rust
/// # use ircserv_tokens::mode::{self, Error, ChannelChange};
/// let mut query = mode::channel_query("-olX+kto", &["admin", "secret_key"]);
///
/// assert_eq!(query.next(), Some(Ok(ChannelChange::ChangeOperator(false, "admin"))));
/// assert_eq!(query.next(), Some(Ok(ChannelChange::UserLimit(None))));
/// assert_eq!(query.next(), Some(Err(Error::Unknown('X', false))));
/// assert_eq!(query.next(), Some(Ok(ChannelChange::Key(Some("secret_key")))));
/// assert_eq!(query.next(), Some(Ok(ChannelChange::TopicRestricted(true))));
/// assert_eq!(query.next(), Some(Err(Error::MissingParam('o', true))));
/// assert_eq!(query.next(), None);
/// ```
pub fn channel_query<'a, I, S>(
    modes: &'a str,
    params: I,
) -> impl Iterator<Item = Result<ChannelChange<'a>>>
where
    I: IntoIterator<Item = &'a S> + 'a,
    S: AsRef<str> + ?Sized + 'a,
{
    let mut params = params
        .into_iter()
        .map(|p| p.as_ref())
        .filter(|p| !p.is_empty());
    SimpleQuery::new(modes).map(move |(value, mode)| {
        use ChannelChange::*;
        match mode {
            'i' => Ok(InviteOnly(value)),
            't' => Ok(TopicRestricted(value)),
            'k' if !value => Ok(Key(None)),
            'l' if !value => Ok(UserLimit(None)),
            'k' | 'l' | 'b' | 'o' => {
                let param = params.next().ok_or(Error::MissingParam(mode, value))?;
                Ok(match mode {
                    'k' => Key(Some(param)),
                    'l' => UserLimit(Some(param)),
                    'b' => ChangeBan(value, param),
                    _ => ChangeOperator(value, param),
                })
            }
            other => Err(Error::Unknown(other, value)),
        }
    })
}

// mod tests
