use crate::{
    models,
    store::{Store, StoreResult, schema},
};

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/////*============== ADMIN QUERIES ==============*/
impl Store {
    /// Creates the default `admin`/`admin` account when no admin exists yet.
    ///
    /// Returns `true` if it was newly added, false otherwise.
    pub fn ensure_default_admin(&self) -> StoreResult<bool> {
        let mut list = self.load::<schema::AdminList>(schema::ADMINS_FILE)?;
        if !list.users.is_empty() {
            return Ok(false);
        }

        list.users.push(models::AdminRecord {
            id: 1,
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        });
        self.save(schema::ADMINS_FILE, &list)?;

        log::info!("Default admin user created.");
        Ok(true)
    }

    /// Returns the admin matching both `username` and `password`, if any.
    pub fn authenticate_admin(
        &self,
        username: &str,
        password: &str,
    ) -> StoreResult<Option<models::AdminRecord>> {
        log::trace!("[authenticate_admin] Checking credentials for '{username}'...");

        if username.is_empty() || password.is_empty() {
            return Ok(None);
        }

        Ok(self.load::<schema::AdminList>(schema::ADMINS_FILE)?
            .users
            .into_iter()
            .find(|admin| admin.username == username && admin.password == password))
    }
}
