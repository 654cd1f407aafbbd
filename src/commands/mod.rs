use crate::discord::{Data, Error};

mod utils;

pub mod help;
pub mod info;
pub mod moderation;
pub mod owner;

/// Every command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        help::help(),
        info::ping(),
        info::health(),
        info::hello(),
        info::badge(),
        moderation::warnings(),
        owner::sync(),
        owner::quit(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_is_registered() {
        let names: Vec<String> = all().into_iter().map(|command| command.name).collect();

        assert!(names.iter().any(|name| name == "help"));
        assert!(names.iter().any(|name| name == "warnings"));
    }
}
