use crate::{
    models,
    store::{Store, StoreError, StoreResult, schema},
};

/////*============== USER QUERIES ==============*/
impl Store {
    /// Gathers every registered user, in file order.
    pub fn query_users(&self) -> StoreResult<Vec<models::UserRecord>> {
        log::trace!("[query_users] Querying all users.");
        self.load::<schema::UserList>(schema::USERS_FILE).map(|list| list.users)
    }

    /// Returns the user with the id: `id`, if they exist.
    pub fn query_user(&self, id: u32) -> StoreResult<Option<models::UserRecord>> {
        Ok(self.query_users()?.into_iter().find(|user| user.id == id))
    }

    /// Returns the user with the username: `username`, if they exist.
    pub fn query_user_by_name(&self, username: &str) -> StoreResult<Option<models::UserRecord>> {
        Ok(self.query_users()?.into_iter().find(|user| user.username == username))
    }

    /// Registers a new player at level 1.
    ///
    /// Rejects empty usernames, non-positive ages, and usernames that are already taken.
    /// The new id is one past the id of the last user in the file.
    pub fn register_user(&self, username: &str, age: i64) -> StoreResult<models::UserRecord> {
        log::trace!("[register_user] Registering user '{username}'...");

        if username.trim().is_empty() {
            log::warn!("[register_user] Username is empty!");
            return Err(StoreError::EmptyUsername);
        }

        let age = u32::try_from(age)
            .ok()
            .filter(|age| *age > 0)
            .ok_or_else(|| {
                log::warn!("[register_user] Age must be greater than zero, got {age}");
                StoreError::InvalidAge
            })?;

        let mut list = self.load::<schema::UserList>(schema::USERS_FILE)?;
        if list.users.iter().any(|user| user.username == username) {
            log::warn!("[register_user] Username '{username}' already exists!");
            return Err(StoreError::UsernameTaken);
        }

        let id = list.users.last().map_or(1, |user| user.id + 1);
        let user = models::UserRecord {
            id,
            username: username.to_string(),
            age,
            current_level: 1,
        };

        list.users.push(user.clone());
        self.save(schema::USERS_FILE, &list)?;

        log::info!("User {} has been registered with id {id}.", user.username);
        Ok(user)
    }

    /// Raises the user's `currentLevel` to `level` if it is higher than the recorded one.
    ///
    /// Returns whether the record changed.
    pub fn update_user_level(&self, user_id: u32, level: u32) -> StoreResult<bool> {
        let mut list = self.load::<schema::UserList>(schema::USERS_FILE)?;

        let user = list.users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or(StoreError::UserNotFound(user_id))
            .inspect_err(|_| log::error!("[update_user_level] User {user_id} not found!"))?;

        if level <= user.current_level {
            log::debug!(
                "[update_user_level] Level {level} is not higher than current level {} \
                 for {}. No update made.",
                user.current_level, user.username
            );
            return Ok(false);
        }

        user.current_level = level;
        log::info!("User {} level updated to {level}", user.username);

        self.save(schema::USERS_FILE, &list)?;
        Ok(true)
    }
}
