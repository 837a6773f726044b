use crate::client::{Client, MessageQueueItem};
use ircserv_tokens::{mode, rpl, MessageBuffer};
use slab::Slab;
use std::collections::{HashMap, HashSet};

/// Modes applied to clients on a per-channel basis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemberModes {
    pub operator: bool,
}

/// Channel data.
///
/// Members are identified by the handle of their connection.  The registry of clients owns the
/// clients; a channel only refers to them.
#[derive(Debug)]
pub struct Channel {
    /// The name of the channel as shown to clients, e.g. "#town".
    pub name: String,

    /// Members and their channel modes.  Operators are the members flagged as such.
    pub members: HashMap<usize, MemberModes>,

    /// The topic.  `None` or empty means no topic is set.
    pub topic: Option<String>,

    /// Mode `l`.
    pub user_limit: Option<usize>,

    /// Mode `k`.
    pub key: Option<String>,

    /// Nicknames that may not join.  Mode `b` is set iff this is not empty.
    pub bans: HashSet<String>,

    /// Nicknames invited with INVITE and not joined yet.
    pub invites: HashSet<String>,

    /// Mode `i`.
    pub invite_only: bool,

    /// Mode `t`.
    pub topic_restricted: bool,
}

impl Channel {
    /// Creates a channel with no member and no mode.  `key` is the registry key, the name
    /// without its leading `#` or `&`.
    pub fn new(key: &str) -> Self {
        Self {
            name: format!("#{}", key),
            members: HashMap::new(),
            topic: None,
            user_limit: None,
            key: None,
            bans: HashSet::new(),
            invites: HashSet::new(),
            invite_only: false,
            topic_restricted: false,
        }
    }

    /// Adds a member to the channel.
    ///
    /// The member becomes channel operator if there is none.  Its invitation, if any, is used up.
    pub fn add_member(&mut self, id: usize, nick: &str) {
        let operator = !self.members.values().any(|m| m.operator);
        self.members.insert(id, MemberModes { operator });
        self.invites.remove(nick);
    }

    /// Removes a member, and its operator status with it.  Returns whether it was a member.
    pub fn remove_member(&mut self, id: usize) -> bool {
        self.members.remove(&id).is_some()
    }

    pub fn is_member(&self, id: usize) -> bool {
        self.members.contains_key(&id)
    }

    pub fn is_operator(&self, id: usize) -> bool {
        self.members.get(&id).map_or(false, |m| m.operator)
    }

    pub fn is_full(&self) -> bool {
        self.user_limit.map_or(false, |limit| limit <= self.members.len())
    }

    pub fn is_banned(&self, nick: &str) -> bool {
        self.bans.contains(nick)
    }

    pub fn is_invited(&self, nick: &str) -> bool {
        !self.invite_only || self.invites.contains(nick)
    }

    /// Whether `key` opens the channel.  Channels without a key accept anything.
    pub fn key_matches(&self, key: Option<&str>) -> bool {
        match self.key {
            Some(ref chan_key) => key == Some(chan_key.as_str()),
            None => true,
        }
    }

    /// The topic, when one is set.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref().filter(|t| !t.is_empty())
    }

    /// Pushes the given message to every member of the channel.
    pub fn broadcast(&self, clients: &Slab<Client>, msg: MessageQueueItem) {
        for member in self.members.keys() {
            if let Some(client) = clients.get(*member) {
                client.send(msg.clone());
            }
        }
    }

    /// Writes the modes of the channel, as in RPL_CHANNELMODEIS.
    ///
    /// The key and the limit are only given when `full_info` is true.
    pub fn modes(&self, mut out: MessageBuffer<'_>, full_info: bool) {
        let modes = out.raw_param();
        modes.push('+');
        if !self.bans.is_empty() {
            modes.push('b');
        }
        if self.invite_only {
            modes.push('i');
        }
        if self.key.is_some() {
            modes.push('k');
        }
        if self.user_limit.is_some() {
            modes.push('l');
        }
        if self.topic_restricted {
            modes.push('t');
        }
        if full_info {
            if let Some(ref key) = self.key {
                out = out.param(key);
            }
            if let Some(user_limit) = self.user_limit {
                out.fmt_param(user_limit);
            }
        }
    }

    /// Applies one change of a MODE query.
    ///
    /// `id_of` resolves the nickname given to `o` into the handle of a member.  Returns whether
    /// the channel changed, or the error reply to send.
    pub fn apply_mode_change<F>(
        &mut self,
        change: mode::ChannelChange<'_>,
        id_of: F,
    ) -> Result<bool, &'static str>
    where
        F: Fn(&str) -> Option<usize>,
    {
        use mode::ChannelChange::*;
        let applied = match change {
            InviteOnly(value) => {
                let applied = self.invite_only != value;
                self.invite_only = value;
                applied
            }
            TopicRestricted(value) => {
                let applied = self.topic_restricted != value;
                self.topic_restricted = value;
                applied
            }
            Key(Some(key)) => {
                let applied = self.key.as_deref() != Some(key);
                self.key = Some(key.to_owned());
                applied
            }
            Key(None) => self.key.take().is_some(),
            UserLimit(Some(s)) => {
                let limit = s.parse().map_err(|_| rpl::ERR_INVALIDMODEPARAM)?;
                let applied = self.user_limit != Some(limit);
                self.user_limit = Some(limit);
                applied
            }
            UserLimit(None) => self.user_limit.take().is_some(),
            ChangeBan(true, nick) => self.bans.insert(nick.to_owned()),
            ChangeBan(false, nick) => self.bans.remove(nick),
            ChangeOperator(value, nick) => {
                let member = id_of(nick)
                    .and_then(|id| self.members.get_mut(&id))
                    .ok_or(rpl::ERR_USERNOTINCHANNEL)?;
                let applied = member.operator != value;
                member.operator = value;
                applied
            }
        };
        Ok(applied)
    }
}
