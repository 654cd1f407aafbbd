use chrono::Duration;
use poise::serenity_prelude::{Mentionable, MessageBuilder, UserId};
use std::collections::BTreeMap;

/// Members listed by `/warnings all` before the list is cut off.
const MAX_LISTED: usize = 25;

/// Formats like `1 day, 2:03:04` or `0:05:09`.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.num_seconds().max(0);
    let (days, rest) = (secs / 86_400, secs % 86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);

    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        days => format!("{} days, {}", days, clock),
    }
}

fn mention(user_id: &str) -> String {
    match user_id.parse::<u64>() {
        Ok(id) if id != 0 => UserId::new(id).mention().to_string(),
        _ => user_id.to_string(),
    }
}

/// One line per member, most warnings first.
pub fn format_guild_warnings(dump: &BTreeMap<String, u64>) -> String {
    let mut response = MessageBuilder::new();
    response.push_bold_line("Warnings in this server:");

    if dump.is_empty() {
        response.push_italic_line("Nobody has been warned yet.");
        return response.build();
    }

    let mut entries: Vec<_> = dump.iter().collect();
    entries.sort_by(|(a_user, a), (b_user, b)| b.cmp(a).then_with(|| a_user.cmp(b_user)));

    for (user, count) in entries.iter().take(MAX_LISTED) {
        response.push_line(format!("{}: {}", mention(user), count));
    }
    if entries.len() > MAX_LISTED {
        response.push_italic_line(format!("...and {} more", entries.len() - MAX_LISTED));
    }

    response.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_like_a_clock() {
        assert_eq!(format_uptime(Duration::seconds(309)), "0:05:09");
        assert_eq!(format_uptime(Duration::seconds(86_400 + 7384)), "1 day, 2:03:04");
        assert_eq!(format_uptime(Duration::seconds(3 * 86_400)), "3 days, 0:00:00");
        assert_eq!(format_uptime(Duration::seconds(-5)), "0:00:00");
    }

    #[test]
    fn guild_warnings_sorted_by_count() {
        let dump: BTreeMap<String, u64> = [("1", 1), ("2", 5), ("3", 2)]
            .into_iter()
            .map(|(user, count)| (user.to_string(), count))
            .collect();

        let text = format_guild_warnings(&dump);
        let lines: Vec<&str> = text.lines().skip(1).collect();

        assert_eq!(lines, vec!["<@2>: 5", "<@3>: 2", "<@1>: 1"]);
    }

    #[test]
    fn empty_guild() {
        let text = format_guild_warnings(&BTreeMap::new());

        assert!(text.contains("Nobody has been warned yet."));
    }

    #[test]
    fn long_lists_are_cut_off() {
        let dump: BTreeMap<String, u64> = (1..=30u64).map(|id| (id.to_string(), id)).collect();

        let text = format_guild_warnings(&dump);

        assert_eq!(text.lines().count(), 1 + MAX_LISTED + 1);
        assert!(text.contains("and 5 more"));
    }
}
