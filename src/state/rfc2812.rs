//! Handlers for the registration, channel and messaging commands.

use super::{
    channel_key, find_channel, find_member, find_nick, flush_replies, is_valid_channel_name,
    is_valid_nickname, CommandContext, HandlerResult as Result, State,
};
use crate::channel::Channel;
use crate::client::MessageQueueItem;
use crate::lines;
use ircserv_tokens::{mode, rpl, Buffer, Command, Message, ReplyBuffer};
use std::collections::{BTreeSet, HashSet};
use std::mem;

fn need_more_params(id: usize, rb: &mut ReplyBuffer, command: Command) -> Result {
    log::debug!("{}:     not enough parameters", id);
    rb.reply(rpl::ERR_NEEDMOREPARAMS)
        .param(command.as_str())
        .trailing_param(lines::NEED_MORE_PARAMS);
    Err(())
}

/// The changes of a MODE query that have actually been applied, e.g. "+it-k".
#[derive(Default)]
struct AppliedModes {
    modes: String,
    params: Vec<String>,
    last_value: bool,
}

impl AppliedModes {
    fn push(&mut self, value: bool, symbol: char, param: Option<&str>) {
        if self.modes.is_empty() || self.last_value != value {
            self.modes.push(if value { '+' } else { '-' });
            self.last_value = value;
        }
        self.modes.push(symbol);
        if let Some(param) = param {
            self.params.push(param.to_owned());
        }
    }

    fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

// Registration

impl State {
    pub(super) fn cmd_pass(&mut self, ctx: CommandContext<'_>, mut msg: Message<'_>) -> Result {
        let client = &mut self.clients[ctx.id];
        if client.is_registered() {
            log::debug!("{}:     already registered", ctx.id);
            ctx.rb
                .reply(rpl::ERR_ALREADYREGISTRED)
                .trailing_param(lines::ALREADY_REGISTERED);
            return Err(());
        }
        if client.pass_ok {
            return Ok(());
        }

        if msg.params.is_empty() {
            msg.promote_trailing();
        }
        if msg.params.len() != 1 {
            return need_more_params(ctx.id, ctx.rb, Command::Pass);
        }
        let password = msg.params[0];
        let password = password.strip_prefix(':').unwrap_or(password);

        if password != self.password {
            log::debug!("{}:     password mismatch", ctx.id);
            ctx.rb
                .reply(rpl::ERR_PASSWDMISMATCH)
                .trailing_param(lines::PASSWORD_MISMATCH);
            return Err(());
        }

        log::debug!("{}: PASS accepted", ctx.id);
        client.pass_ok = true;
        Ok(())
    }

    /// NICK, both for registration and to change nickname afterwards.
    pub(super) fn cmd_nick(&mut self, ctx: CommandContext<'_>, mut msg: Message<'_>) -> Result {
        if !self.clients[ctx.id].pass_ok {
            log::debug!("{}:     password not given", ctx.id);
            ctx.rb
                .reply(rpl::ERR_NOTREGISTERED)
                .trailing_param(lines::NOT_REGISTERED);
            return Err(());
        }

        if msg.params.is_empty() {
            msg.promote_trailing();
        }
        let nick = match msg.param(0) {
            Some(nick) => nick,
            None => {
                log::debug!("{}:     no nickname given", ctx.id);
                ctx.rb
                    .reply(rpl::ERR_NONICKNAMEGIVEN)
                    .trailing_param(lines::NO_NICKNAME_GIVEN);
                return Err(());
            }
        };
        if !is_valid_nickname(nick) {
            log::debug!("{}:     erroneous nickname", ctx.id);
            ctx.rb
                .reply(rpl::ERR_ERRONEUSNICKNAME)
                .param(nick)
                .trailing_param(lines::ERRONEOUS_NICKNAME);
            return Err(());
        }
        if self
            .clients
            .iter()
            .any(|(_, client)| client.has_nick && client.nick() == nick)
        {
            log::debug!("{}:     nickname in use", ctx.id);
            ctx.rb
                .reply(rpl::ERR_NICKNAMEINUSE)
                .param(nick)
                .trailing_param(lines::NICKNAME_IN_USE);
            return Err(());
        }

        log::debug!("{}: NICK {}", ctx.id, nick);
        let client = &self.clients[ctx.id];
        let mut response = Buffer::new();
        response.message(client.full_name(), Command::Nick).param(nick);
        let nick_change = MessageQueueItem::from(response);

        let mut recipients = BTreeSet::new();
        recipients.insert(ctx.id);
        for key in &client.channels {
            if let Some(channel) = self.channels.get(key) {
                recipients.extend(channel.members.keys().copied());
            }
        }
        for id in recipients {
            self.send(id, nick_change.clone());
        }

        let client = &mut self.clients[ctx.id];
        client.set_nick(nick);
        client.has_nick = true;
        ctx.rb.set_nick(nick);
        Ok(())
    }

    pub(super) fn cmd_user(&mut self, ctx: CommandContext<'_>, msg: Message<'_>) -> Result {
        let client = &mut self.clients[ctx.id];
        if !client.pass_ok {
            log::debug!("{}:     password not given", ctx.id);
            ctx.rb
                .reply(rpl::ERR_NOTREGISTERED)
                .trailing_param(lines::NOT_REGISTERED);
            return Err(());
        }
        if client.is_registered() {
            log::debug!("{}:     already registered", ctx.id);
            ctx.rb
                .reply(rpl::ERR_ALREADYREGISTRED)
                .trailing_param(lines::ALREADY_REGISTERED);
            return Err(());
        }

        let user = match msg.param(0) {
            Some(user) => user,
            None => return need_more_params(ctx.id, ctx.rb, Command::User),
        };
        let real = match msg.trailing {
            Some(real) if !real.is_empty() => real,
            _ => msg.param(3).unwrap_or(""),
        };

        log::debug!("{}: USER {} {:?}", ctx.id, user, real);
        client.set_user_real(user, real);
        client.has_user = true;
        Ok(())
    }
}

// Connection

impl State {
    pub(super) fn cmd_ping(&self, ctx: CommandContext<'_>, mut msg: Message<'_>) -> Result {
        if msg.params.is_empty() {
            msg.promote_trailing();
        }
        let token = match msg.param(0) {
            Some(token) => token,
            None => return need_more_params(ctx.id, ctx.rb, Command::Ping),
        };
        ctx.rb
            .prefixed_message(Command::Pong)
            .param(&self.domain)
            .trailing_param(token);
        Ok(())
    }

    /// QUIT.  Tells everyone, leaves every channel, and marks the client for disconnection.
    pub(super) fn cmd_quit(&mut self, ctx: CommandContext<'_>, msg: Message<'_>) -> Result {
        let reason = msg
            .trailing
            .or_else(|| msg.param(0))
            .filter(|reason| !reason.is_empty())
            .unwrap_or(lines::CLIENT_QUIT);
        log::debug!("{}: QUIT {:?}", ctx.id, reason);

        let mut response = Buffer::new();
        response
            .message(self.clients[ctx.id].full_name(), Command::Quit)
            .trailing_param(reason);
        let quit = MessageQueueItem::from(response);
        for (id, client) in &self.clients {
            if id != ctx.id {
                client.send(quit.clone());
            }
        }

        self.part_all(ctx.id, Some(reason));
        self.clients[ctx.id].pending_disconnect = true;
        Ok(())
    }
}

// Channels

impl State {
    pub(super) fn cmd_join(&mut self, ctx: CommandContext<'_>, mut msg: Message<'_>) -> Result {
        msg.promote_trailing();
        let targets = match msg.param(0) {
            Some(targets) => targets,
            None => return need_more_params(ctx.id, ctx.rb, Command::Join),
        };
        if targets == "0" {
            log::debug!("{}: JOIN 0", ctx.id);
            self.part_all(ctx.id, None);
            return Ok(());
        }

        let keys: Vec<&str> = msg.param(1).map_or_else(Vec::new, |keys| {
            keys.split(',').filter(|key| !key.is_empty()).collect()
        });
        let mut processed = HashSet::new();
        for (i, name) in targets.split(',').filter(|name| !name.is_empty()).enumerate() {
            if processed.insert(name) {
                let _ = self.join_channel(ctx.id, ctx.rb, name, keys.get(i).copied());
            }
        }
        Ok(())
    }

    fn join_channel(
        &mut self,
        id: usize,
        rb: &mut ReplyBuffer,
        name: &str,
        key: Option<&str>,
    ) -> Result {
        if !is_valid_channel_name(name) {
            log::debug!("{}:     invalid channel name {:?}", id, name);
            return need_more_params(id, rb, Command::Join);
        }

        let chan_key = channel_key(name);
        let client = &self.clients[id];
        if let Some(channel) = self.channels.get(chan_key) {
            if channel.is_member(id) {
                log::debug!("{}:     already in {}", id, name);
                rb.reply(rpl::ERR_USERONCHANNEL)
                    .param(client.nick())
                    .param(name)
                    .trailing_param(lines::USER_ON_CHANNEL);
                return Err(());
            }
            if !channel.key_matches(key) {
                log::debug!("{}:     bad key for {}", id, name);
                rb.reply(rpl::ERR_BADCHANKEY)
                    .param(name)
                    .trailing_param(lines::BAD_CHAN_KEY);
                return Err(());
            }
            if channel.is_full() {
                log::debug!("{}:     {} is full", id, name);
                rb.reply(rpl::ERR_CHANNELISFULL)
                    .param(name)
                    .trailing_param(lines::CHANNEL_IS_FULL);
                return Err(());
            }
            if !channel.is_invited(client.nick()) {
                log::debug!("{}:     not invited to {}", id, name);
                rb.reply(rpl::ERR_INVITEONLYCHAN)
                    .param(name)
                    .trailing_param(lines::INVITE_ONLY_CHAN);
                return Err(());
            }
            if channel.is_banned(client.nick()) {
                log::debug!("{}:     banned from {}", id, name);
                rb.reply(rpl::ERR_BANNEDFROMCHAN)
                    .param(name)
                    .trailing_param(lines::BANNED_FROM_CHAN);
                return Err(());
            }
        }

        log::debug!("{}: JOIN {}", id, name);
        flush_replies(&self.clients, id, rb);
        let channel = self
            .channels
            .entry(chan_key.to_owned())
            .or_insert_with(|| Channel::new(chan_key));
        channel.add_member(id, client.nick());

        let mut response = Buffer::new();
        response
            .message(client.full_name(), Command::Join)
            .param(&channel.name);
        channel.broadcast(&self.clients, MessageQueueItem::from(response));
        Self::write_topic(rb, channel);

        self.clients[id].channels.insert(chan_key.to_owned());
        Ok(())
    }

    /// Broadcasts a PART for the channel of the given key, then removes the client from it.
    fn part_channel(&mut self, id: usize, key: &str, reason: Option<&str>) {
        let channel = match self.channels.get(key) {
            Some(channel) => channel,
            None => return,
        };
        let mut response = Buffer::new();
        {
            let msg = response
                .message(self.clients[id].full_name(), Command::Part)
                .param(&channel.name);
            if let Some(reason) = reason {
                msg.trailing_param(reason);
            }
        }
        channel.broadcast(&self.clients, MessageQueueItem::from(response));
        self.leave_channel(id, key);
    }

    fn part_all(&mut self, id: usize, reason: Option<&str>) {
        let keys: Vec<String> = self.clients[id].channels.iter().cloned().collect();
        for key in keys {
            self.part_channel(id, &key, reason);
        }
    }

    pub(super) fn cmd_part(&mut self, ctx: CommandContext<'_>, msg: Message<'_>) -> Result {
        let (targets, reason) = match msg.param(0) {
            Some(targets) => (targets, msg.trailing.or_else(|| msg.param(1))),
            None => match msg.trailing {
                Some(targets) if !targets.is_empty() => (targets, None),
                _ => return need_more_params(ctx.id, ctx.rb, Command::Part),
            },
        };

        for name in targets.split(',').filter(|name| !name.is_empty()) {
            let channel = match find_channel(ctx.id, ctx.rb, &self.channels, name) {
                Ok(channel) => channel,
                Err(()) => continue,
            };
            if find_member(ctx.id, ctx.rb, channel, name).is_err() {
                continue;
            }
            log::debug!("{}: PART {}", ctx.id, name);
            flush_replies(&self.clients, ctx.id, ctx.rb);
            self.part_channel(ctx.id, channel_key(name), reason);
        }
        Ok(())
    }

    pub(super) fn cmd_topic(&mut self, ctx: CommandContext<'_>, msg: Message<'_>) -> Result {
        let name = match msg.param(0) {
            Some(name) => name,
            None => return need_more_params(ctx.id, ctx.rb, Command::Topic),
        };
        let channel = find_channel(ctx.id, ctx.rb, &self.channels, name)?;
        let topic = match msg.trailing.or_else(|| msg.param(1)) {
            Some(topic) => topic,
            None => {
                Self::write_topic(ctx.rb, channel);
                return Ok(());
            }
        };

        let member = find_member(ctx.id, ctx.rb, channel, name)?;
        if channel.topic_restricted && !member.operator {
            log::debug!("{}:     not operator", ctx.id);
            ctx.rb
                .reply(rpl::ERR_CHANOPRIVSNEEDED)
                .param(name)
                .trailing_param(lines::CHAN_O_PRIVS_NEEDED);
            return Err(());
        }

        log::debug!("{}: TOPIC {} {:?}", ctx.id, name, topic);
        let channel = match self.channels.get_mut(channel_key(name)) {
            Some(channel) => channel,
            None => return Err(()),
        };
        channel.topic = if topic.is_empty() {
            None
        } else {
            Some(topic.to_owned())
        };

        let mut response = Buffer::new();
        response
            .message(self.clients[ctx.id].full_name(), Command::Topic)
            .param(&channel.name)
            .trailing_param(topic);
        channel.broadcast(&self.clients, MessageQueueItem::from(response));
        Ok(())
    }

    pub(super) fn cmd_kick(&mut self, ctx: CommandContext<'_>, msg: Message<'_>) -> Result {
        let (name, nick) = match (msg.param(0), msg.param(1)) {
            (Some(name), Some(nick)) => (name, nick),
            _ => return need_more_params(ctx.id, ctx.rb, Command::Kick),
        };
        let channel = find_channel(ctx.id, ctx.rb, &self.channels, name)?;
        let member = find_member(ctx.id, ctx.rb, channel, name)?;
        if !member.operator {
            log::debug!("{}:     not operator", ctx.id);
            ctx.rb
                .reply(rpl::ERR_CHANOPRIVSNEEDED)
                .param(name)
                .trailing_param(lines::CHAN_O_PRIVS_NEEDED);
            return Err(());
        }

        let clients = &self.clients;
        let kicked = channel
            .members
            .keys()
            .copied()
            .find(|&m| clients.get(m).map_or(false, |c| c.nick() == nick));
        let kicked = match kicked {
            Some(kicked) => kicked,
            None => {
                log::debug!("{}:     {} not on channel", ctx.id, nick);
                ctx.rb
                    .reply(rpl::ERR_USERNOTINCHANNEL)
                    .param(nick)
                    .param(name)
                    .trailing_param(lines::USER_NOT_IN_CHANNEL);
                return Err(());
            }
        };

        let kicker = &self.clients[ctx.id];
        let reason = msg
            .param(2)
            .or(msg.trailing)
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| kicker.nick());
        log::debug!("{}: KICK {} {} {:?}", ctx.id, name, nick, reason);

        let mut response = Buffer::new();
        response
            .message(kicker.full_name(), Command::Kick)
            .param(&channel.name)
            .param(nick)
            .trailing_param(reason);
        channel.broadcast(&self.clients, MessageQueueItem::from(response));

        self.leave_channel(kicked, channel_key(name));
        Ok(())
    }

    pub(super) fn cmd_invite(&mut self, ctx: CommandContext<'_>, msg: Message<'_>) -> Result {
        let (nick, name) = match (msg.param(0), msg.param(1)) {
            (Some(nick), Some(name)) => (nick, name),
            _ => return need_more_params(ctx.id, ctx.rb, Command::Invite),
        };
        let channel = find_channel(ctx.id, ctx.rb, &self.channels, name)?;
        let member = find_member(ctx.id, ctx.rb, channel, name)?;
        if channel.invite_only && !member.operator {
            log::debug!("{}:     not operator", ctx.id);
            ctx.rb
                .reply(rpl::ERR_CHANOPRIVSNEEDED)
                .param(name)
                .trailing_param(lines::CHAN_O_PRIVS_NEEDED);
            return Err(());
        }
        let target = find_nick(ctx.id, ctx.rb, &self.clients, nick)?;
        if channel.is_member(target) {
            log::debug!("{}:     {} already on channel", ctx.id, nick);
            ctx.rb
                .reply(rpl::ERR_USERONCHANNEL)
                .param(nick)
                .param(name)
                .trailing_param(lines::USER_ON_CHANNEL);
            return Err(());
        }

        log::debug!("{}: INVITE {} {}", ctx.id, nick, name);
        ctx.rb.reply(rpl::INVITING).param(nick).param(&channel.name);
        let mut response = Buffer::new();
        response
            .message(self.clients[ctx.id].full_name(), Command::Invite)
            .param(nick)
            .param(&channel.name);
        self.clients[target].send(response);

        if let Some(channel) = self.channels.get_mut(channel_key(name)) {
            channel.invites.insert(nick.to_owned());
        }
        Ok(())
    }
}

// Messages

impl State {
    pub(super) fn cmd_privmsg(&mut self, ctx: CommandContext<'_>, msg: Message<'_>) -> Result {
        let text = msg.trailing_or_empty();
        let targets = match msg.param(0) {
            Some(targets) if !text.is_empty() => targets,
            _ => return need_more_params(ctx.id, ctx.rb, Command::PrivMsg),
        };

        let full_name = self.clients[ctx.id].full_name();
        let mut processed = HashSet::new();
        for target in targets.split(',') {
            if target.is_empty() || !processed.insert(target) {
                continue;
            }

            let mut response = Buffer::new();
            response
                .message(full_name, Command::PrivMsg)
                .param(target)
                .trailing_param(text);
            let privmsg = MessageQueueItem::from(response);

            if target.starts_with('#') {
                let channel = match find_channel(ctx.id, ctx.rb, &self.channels, target) {
                    Ok(channel) => channel,
                    Err(()) => continue,
                };
                log::debug!("{}: PRIVMSG {}", ctx.id, target);
                flush_replies(&self.clients, ctx.id, ctx.rb);
                channel.broadcast(&self.clients, privmsg);
            } else {
                let target_id = match find_nick(ctx.id, ctx.rb, &self.clients, target) {
                    Ok(target_id) => target_id,
                    Err(()) => continue,
                };
                log::debug!("{}: PRIVMSG {}", ctx.id, target);
                flush_replies(&self.clients, ctx.id, ctx.rb);
                self.send(target_id, privmsg.clone());
                if target_id != ctx.id {
                    self.send(ctx.id, privmsg);
                }
            }
        }
        Ok(())
    }
}

// Modes

impl State {
    pub(super) fn cmd_mode(&mut self, ctx: CommandContext<'_>, mut msg: Message<'_>) -> Result {
        msg.promote_trailing();
        let target = match msg.param(0) {
            Some(target) => target,
            None => return need_more_params(ctx.id, ctx.rb, Command::Mode),
        };
        let modes = msg.param(1);
        if target.starts_with('#') {
            let params = msg.params.get(2..).unwrap_or(&[]);
            self.cmd_mode_channel(ctx, target, modes, params)
        } else {
            self.cmd_mode_user(ctx, target, modes)
        }
    }

    fn cmd_mode_user(&mut self, ctx: CommandContext<'_>, target: &str, modes: Option<&str>) -> Result {
        let client = &mut self.clients[ctx.id];
        if target != client.nick() {
            log::debug!("{}:     can't change modes of {}", ctx.id, target);
            ctx.rb
                .reply(rpl::ERR_USERSDONTMATCH)
                .trailing_param(lines::USERS_DONT_MATCH);
            return Err(());
        }
        let modes = match modes {
            Some(modes) => modes,
            None => {
                ctx.rb.reply(rpl::UMODEIS).param(&client.modes());
                return Ok(());
            }
        };
        if !mode::is_signed(modes) {
            log::debug!("{}:     unsigned mode string {:?}", ctx.id, modes);
            ctx.rb
                .reply(rpl::ERR_UMODEUNKNOWNFLAG)
                .trailing_param(lines::UMODE_UNKNOWN_FLAG);
            return Err(());
        }

        let mut applied = AppliedModes::default();
        for change in mode::user_query(modes) {
            match change {
                Ok(change) => {
                    let was = match change {
                        mode::UserChange::Invisible(value) => {
                            mem::replace(&mut client.invisible, value)
                        }
                        mode::UserChange::DeOperator => mem::replace(&mut client.operator, false),
                    };
                    if was != change.value() {
                        applied.push(change.value(), change.symbol(), None);
                    }
                }
                Err(err) => {
                    log::debug!("{}:     {:?}", ctx.id, err);
                    ctx.rb
                        .reply(rpl::ERR_UMODEUNKNOWNFLAG)
                        .trailing_param(lines::UMODE_UNKNOWN_FLAG);
                }
            }
        }

        if !applied.is_empty() {
            log::debug!("{}: MODE {} {}", ctx.id, target, applied.modes);
            ctx.rb
                .message(client.full_name(), Command::Mode)
                .param(client.nick())
                .param(&applied.modes);
        }
        Ok(())
    }

    fn cmd_mode_channel(
        &mut self,
        ctx: CommandContext<'_>,
        name: &str,
        modes: Option<&str>,
        params: &[&str],
    ) -> Result {
        let channel = find_channel(ctx.id, ctx.rb, &self.channels, name)?;
        let member = find_member(ctx.id, ctx.rb, channel, name)?;
        let modes = match modes {
            Some(modes) => modes,
            None => {
                channel.modes(ctx.rb.reply(rpl::CHANNELMODEIS).param(&channel.name), true);
                return Ok(());
            }
        };
        if !member.operator {
            log::debug!("{}:     not operator", ctx.id);
            ctx.rb
                .reply(rpl::ERR_CHANOPRIVSNEEDED)
                .param(name)
                .trailing_param(lines::CHAN_O_PRIVS_NEEDED);
            return Err(());
        }
        if !mode::is_signed(modes) {
            log::debug!("{}:     unsigned mode string {:?}", ctx.id, modes);
            ctx.rb
                .reply(rpl::ERR_UMODEUNKNOWNFLAG)
                .trailing_param(lines::UMODE_UNKNOWN_FLAG);
            return Err(());
        }

        let channel = match self.channels.get_mut(channel_key(name)) {
            Some(channel) => channel,
            None => return Err(()),
        };
        let clients = &self.clients;
        let id_of = |nick: &str| {
            clients
                .iter()
                .find(|(_, client)| client.nick() == nick)
                .map(|(id, _)| id)
        };

        let mut applied = AppliedModes::default();
        for change in mode::channel_query(modes, params) {
            match change {
                Ok(change) => match channel.apply_mode_change(change, id_of) {
                    Ok(true) => {
                        log::debug!("{}:     applied {:?}", ctx.id, change);
                        applied.push(change.value(), change.symbol(), change.param());
                    }
                    Ok(false) => {}
                    Err(rpl::ERR_USERNOTINCHANNEL) => {
                        log::debug!("{}:     {:?} not on channel", ctx.id, change.param());
                        ctx.rb
                            .reply(rpl::ERR_USERNOTINCHANNEL)
                            .param(change.param().unwrap_or(""))
                            .param(name)
                            .trailing_param(lines::USER_NOT_IN_CHANNEL);
                    }
                    Err(reply) => {
                        log::debug!("{}:     invalid parameter for {:?}", ctx.id, change);
                        ctx.rb
                            .reply(reply)
                            .param(name)
                            .fmt_param(change.symbol())
                            .param(change.param().unwrap_or(""))
                            .trailing_param(lines::INVALID_LIMIT);
                    }
                },
                Err(mode::Error::MissingParam(letter, _)) => {
                    log::debug!("{}:     missing parameter for {}", ctx.id, letter);
                    ctx.rb
                        .reply(rpl::ERR_NEEDMOREPARAMS)
                        .param(Command::Mode.as_str())
                        .trailing_param(lines::NEED_MORE_PARAMS);
                }
                Err(mode::Error::Unknown(letter, _)) | Err(mode::Error::Unchangeable(letter, _)) => {
                    log::debug!("{}:     unknown mode {}", ctx.id, letter);
                    ctx.rb
                        .reply(rpl::ERR_UNKNOWNMODE)
                        .fmt_param(letter)
                        .trailing_param(lines::UNKNOWN_MODE);
                }
            }
        }

        if !applied.is_empty() {
            log::debug!("{}: MODE {} {} {:?}", ctx.id, name, applied.modes, applied.params);
            flush_replies(&self.clients, ctx.id, ctx.rb);
            let mut response = Buffer::new();
            {
                let mut msg = response
                    .message(self.clients[ctx.id].full_name(), Command::Mode)
                    .param(&channel.name)
                    .param(&applied.modes);
                for param in &applied.params {
                    msg = msg.param(param);
                }
            }
            channel.broadcast(&self.clients, MessageQueueItem::from(response));
        }
        Ok(())
    }
}
