//! Rankings of players per level, computed fresh from the user and attempt lists.

use itertools::Itertools;
use regex::Regex;

use std::sync::LazyLock;

use crate::models::{AttemptRecord, UserRecord};

/// How many rows the top list shows.
pub const TOP_LIMIT: usize = 10;

const UNKNOWN_USER: &str = "Unknown User";

static LEVEL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+").expect("level number pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    pub rank: usize,
    pub username: String,
    pub attempts: u32,
}

impl std::fmt::Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rank {}: {} - {} attempts", self.rank, self.username, self.attempts)
    }
}

/// Extracts the level number from a label such as `"Level 7"`, `"Level: 7"` or `"7"`.
/// Negative numbers are rejected.
pub fn parse_level_label(label: &str) -> Option<u32> {
    LEVEL_NUMBER
        .find(label)
        .and_then(|m| m.as_str().parse().ok())
        .inspect(|level| log::trace!("[parse_level_label] '{label}' -> {level}"))
}

/// Players who have beaten `level`, fewest total attempts first.
pub fn student_rankings(users: &[UserRecord], attempts: &[AttemptRecord], level: u32) -> Vec<Ranking> {
    rank_users(
        users,
        attempts,
        level,
        |attempt| attempt.victory_attempts + attempt.gameover_attempts,
        |records| records.iter().any(|a| a.has_victory()),
    )
}

/// Every player who has finished `level` at least once, won or lost, fewest attempts first.
pub fn admin_rankings(users: &[UserRecord], attempts: &[AttemptRecord], level: u32) -> Vec<Ranking> {
    rank_users(users, attempts, level, |attempt| attempt.attempt, |_| true)
}

/// The [`TOP_LIMIT`] attempt records for `level` with the lowest counts.
pub fn top_attempts(users: &[UserRecord], attempts: &[AttemptRecord], level: u32) -> Vec<Ranking> {
    attempts
        .iter()
        .filter(|attempt| attempt.level == level)
        .sorted_by_key(|attempt| attempt.attempt)
        .take(TOP_LIMIT)
        .enumerate()
        .map(|(i, attempt)| Ranking {
            rank: i + 1,
            username: users
                .iter()
                .find(|user| user.id == attempt.user_id)
                .map_or_else(|| UNKNOWN_USER.to_string(), |user| user.username.clone()),
            attempts: attempt.attempt,
        })
        .collect()
}

/// Renders rankings one per line under a heading.
pub fn render(title: &str, rankings: &[Ranking]) -> String {
    if rankings.is_empty() {
        return format!("**{title}**\n\tNo attempts yet.");
    }

    format!("**{title}**\n\t{}", rankings.iter().join("\n\t"))
}

fn rank_users(
    users: &[UserRecord],
    attempts: &[AttemptRecord],
    level: u32,
    count: impl Fn(&AttemptRecord) -> u32,
    include: impl Fn(&[&AttemptRecord]) -> bool,
) -> Vec<Ranking> {
    users
        .iter()
        .filter_map(|user| {
            let records = attempts
                .iter()
                .filter(|attempt| attempt.user_id == user.id && attempt.level == level)
                .collect::<Vec<_>>();

            let total: u32 = records.iter().map(|attempt| count(*attempt)).sum();
            (total > 0 && include(&records)).then_some((user, total))
        })
        .sorted_by_key(|(_, total)| *total)
        .enumerate()
        .map(|(i, (user, total))| Ranking {
            rank: i + 1,
            username: user.username.clone(),
            attempts: total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u32, username: &str) -> UserRecord {
        UserRecord { id, username: username.into(), age: 10, current_level: 5 }
    }

    fn attempt(user_id: u32, level: u32, victories: u32, game_overs: u32) -> AttemptRecord {
        AttemptRecord {
            attempt_id: user_id * 100 + level,
            level,
            user_id,
            attempt: victories + game_overs,
            victory_attempts: victories,
            gameover_attempts: game_overs,
            updated_at: None,
        }
    }

    #[test]
    fn students_need_a_victory_and_sort_ascending() {
        let users = [user(1, "ana"), user(2, "ben"), user(3, "cai"), user(4, "dee")];
        let attempts = [
            attempt(1, 3, 1, 4),
            attempt(2, 3, 0, 2),
            attempt(3, 3, 1, 0),
            attempt(4, 2, 1, 0),
        ];

        let rankings = student_rankings(&users, &attempts, 3);
        assert_eq!(rankings, vec![
            Ranking { rank: 1, username: "cai".into(), attempts: 1 },
            Ranking { rank: 2, username: "ana".into(), attempts: 5 },
        ]);
    }

    #[test]
    fn students_are_ranked_by_victories_plus_game_overs() {
        let users = [user(1, "ana"), user(2, "ben")];
        let mut legacy = attempt(1, 3, 1, 0);
        legacy.attempt = 6;
        let attempts = [legacy, attempt(2, 3, 1, 2)];

        let rankings = student_rankings(&users, &attempts, 3);
        assert_eq!(rankings[0], Ranking { rank: 1, username: "ana".into(), attempts: 1 });
        assert_eq!(rankings[1].attempts, 3);

        let admin = admin_rankings(&users, &attempts, 3);
        assert_eq!(admin[0].username, "ben");
        assert_eq!(admin[1].attempts, 6);
    }

    #[test]
    fn admins_see_everyone_with_attempts_and_ties_keep_file_order() {
        let users = [user(1, "ana"), user(2, "ben"), user(3, "cai")];
        let attempts = [attempt(2, 3, 0, 2), attempt(1, 3, 2, 0), attempt(3, 4, 1, 0)];

        let names = admin_rankings(&users, &attempts, 3)
            .into_iter()
            .map(|r| r.username)
            .collect::<Vec<_>>();
        assert_eq!(names, ["ana", "ben"]);
    }

    #[test]
    fn top_list_is_capped_and_resolves_unknown_users() {
        let users = [user(1, "ana")];
        let mut attempts = (1..=12).map(|id| attempt(id, 6, 1, id)).collect::<Vec<_>>();
        attempts.push(attempt(1, 7, 1, 0));

        let top = top_attempts(&users, &attempts, 6);
        assert_eq!(top.len(), TOP_LIMIT);
        assert_eq!(top[0].to_string(), "Rank 1: ana - 2 attempts");
        assert_eq!(top[1].username, UNKNOWN_USER);
        assert_eq!(top[9].attempts, 11);
    }

    #[test]
    fn level_labels() {
        assert_eq!(parse_level_label("Level 7"), Some(7));
        assert_eq!(parse_level_label("Level: 12"), Some(12));
        assert_eq!(parse_level_label("3"), Some(3));
        assert_eq!(parse_level_label("Level"), None);
        assert_eq!(parse_level_label("-3"), None);
        assert_eq!(parse_level_label("Level -5"), None);
    }

    #[test]
    fn empty_board_renders_placeholder() {
        assert!(render("Level 1", &[]).contains("No attempts yet."));
    }
}
