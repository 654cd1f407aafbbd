use crate::discord::Context;
use crate::discord::Error;

/// Checks whether the user is the bot owner.
pub async fn is_owner(ctx: Context<'_>) -> Result<bool, Error> {
    let owner = ctx.data().settings.owner;

    if owner != 0 && owner == ctx.author().id.get() {
        Ok(true)
    } else {
        ctx.say("You need to be the bot owner to execute this command.")
            .await?;
        Ok(false)
    }
}
