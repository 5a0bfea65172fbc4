use serde::{Deserialize, Serialize};

use crate::models;

pub const USERS_FILE: &str = "userdata.json";
pub const ATTEMPTS_FILE: &str = "attempts.json";
pub const ADMINS_FILE: &str = "admindata.json";

/// On-disk envelope of `userdata.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<models::UserRecord>,
}

/// On-disk envelope of `attempts.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AttemptList {
    #[serde(default)]
    pub attempts: Vec<models::AttemptRecord>,
}

/// On-disk envelope of `admindata.json`. The key is `users` for compatibility with existing saves.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AdminList {
    #[serde(default)]
    pub users: Vec<models::AdminRecord>,
}
