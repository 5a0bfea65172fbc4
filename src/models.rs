use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Number of lives a player starts each level with.
pub const STARTING_LIVES: u32 = 3;

/// The last level of the game. Users whose `currentLevel` reaches it have completed everything.
pub const FINAL_LEVEL: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u32,
    pub username: String,
    pub age: u32,

    #[serde(rename = "currentLevel", default = "first_level")]
    pub current_level: u32,
}

fn first_level() -> u32 { 1 }

impl UserRecord {
    /// Whether `level` is unlocked for this user.
    pub fn can_play(&self, level: u32) -> bool {
        level >= 1 && level <= self.current_level
    }

    pub fn completed_all_levels(&self) -> bool {
        self.current_level >= FINAL_LEVEL
    }
}

impl std::fmt::Display for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "**Player:** {}\n\
             \tId: {}\n\
             \tAge: {}\n\
             \tCurrent Level: {}",
            self.username, self.id, self.age, self.current_level
        )
    }
}

/// How a play-through of a level ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    Victory,
    GameOver,
}

/// Counts how often a user finished a level, one record per (user, level).
///
/// `attempt` is the running total. Files written with only the single counter
/// still load: the split counters default to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_id: u32,
    pub level: u32,
    pub user_id: u32,

    #[serde(default)]
    pub attempt: u32,
    #[serde(default)]
    pub victory_attempts: u32,
    #[serde(default)]
    pub gameover_attempts: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl AttemptRecord {
    pub fn new(attempt_id: u32, user_id: u32, level: u32) -> Self {
        Self {
            attempt_id,
            level,
            user_id,
            attempt: 0,
            victory_attempts: 0,
            gameover_attempts: 0,
            updated_at: None,
        }
    }

    pub fn increment(&mut self, kind: AttemptKind, timestamp: i64) {
        self.attempt += 1;
        match kind {
            AttemptKind::Victory => self.victory_attempts += 1,
            AttemptKind::GameOver => self.gameover_attempts += 1,
        }
        self.updated_at = Some(timestamp);
    }

    pub fn has_victory(&self) -> bool {
        self.victory_attempts > 0
    }
}

impl std::fmt::Display for AttemptRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "**Attempt #{}** (user {}, level {})\n\
             \tTotal: {}\n\
             \tVictories: {}\n\
             \tGame Overs: {}\n\
             \tLast Played: {}",
            self.attempt_id, self.user_id, self.level,
            self.attempt,
            self.victory_attempts,
            self.gameover_attempts,
            self.updated_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map_or_else(|| String::from("unknown"), |dt| dt.to_string()),
        )
    }
}

/// Teacher accounts. Passwords are stored in plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub id: u32,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub answer: i64,
}

impl Question {
    pub fn new(prompt: impl Into<String>, answer: i64) -> Self {
        Self { prompt: prompt.into(), answer }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub number: u32,
    pub questions: Vec<Question>,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Level {} ({} questions)", self.number, self.questions.len())
    }
}
