//! BotServ - channel bot services.
//!
//! Only HELP is served here; the listing ends with a footer describing how
//! assigned bots behave on this network.

use super::ServiceKind;
use super::context::ServiceContext;

/// Footer appended to `BotServ HELP`. Configuration values are passed
/// through verbatim; only the first fantasy character is shown.
pub fn help_footer(ctx: &ServiceContext) -> String {
    let config = &ctx.config;
    let fantasy = config.botserv.fantasy_character.chars().next().unwrap_or('!');
    format!(
        "Bot will join a channel whose user count is \x02{}\x02 or more.\n\
         Channel founders manage assigned bots through \x02{}\x02.\n\
         Fantasy commands are prefixed with \x02{}\x02 in channels.",
        config.botserv.min_users,
        ServiceKind::ChanServ.agent(&config.services),
        fantasy
    )
}
