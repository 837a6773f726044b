//! Handler for the CAP command.
//!
//! No capability is offered: LS lists nothing and REQ acknowledges nothing.  Clients that
//! negotiate capabilities can still register.

use super::{CommandContext, HandlerResult, State};
use crate::lines;
use ircserv_tokens::{rpl, Command, Message};

impl State {
    pub(super) fn cmd_cap(&self, ctx: CommandContext<'_>, msg: Message<'_>) -> HandlerResult {
        let subcommand = match msg.param(0) {
            Some(subcommand) => subcommand,
            None => {
                log::debug!("{}:     not enough parameters", ctx.id);
                ctx.rb
                    .reply(rpl::ERR_NEEDMOREPARAMS)
                    .param(Command::Cap.as_str())
                    .trailing_param(lines::NEED_MORE_PARAMS);
                return Err(());
            }
        };

        match subcommand {
            "LS" => {
                ctx.rb.reply(Command::Cap).param("LS").trailing_param("");
            }
            "REQ" => {
                ctx.rb.reply(Command::Cap).param("ACK").trailing_param("");
            }
            "END" => {}
            _ => log::debug!("{}:     unknown CAP subcommand {:?}", ctx.id, subcommand),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test::*;
    use crate::lines;

    #[test]
    fn test_cap_during_registration() {
        let mut state = simple_state();
        let (id, mut queue) = add_client(&mut state);
        flush(&mut queue);

        handle_message(&mut state, id, "CAP LS 302");
        handle_message(&mut state, id, "CAP REQ :multi-prefix");
        handle_message(&mut state, id, "CAP ls");
        handle_message(&mut state, id, "CAP");
        handle_message(&mut state, id, "CAP END");

        let mut res = String::new();
        collect(&mut res, &mut queue);
        assert_msgs(
            &res,
            &[
                (Some("ircserv.test"), "CAP", &["*", "LS", ""]),
                (Some("ircserv.test"), "CAP", &["*", "ACK", ""]),
                (Some("ircserv.test"), "461", &["*", "CAP", lines::NEED_MORE_PARAMS]),
            ],
        );
        assert!(!state.clients[id].is_registered());
    }
}
