use chrono::Utc;

use crate::{
    models::{self, AttemptKind},
    store::{Store, StoreResult, schema},
};

/////*============== ATTEMPT QUERIES ==============*/
impl Store {
    /// Gathers every attempt record, in file order.
    pub fn query_attempts(&self) -> StoreResult<Vec<models::AttemptRecord>> {
        log::trace!("[query_attempts] Querying all attempts.");
        self.load::<schema::AttemptList>(schema::ATTEMPTS_FILE).map(|list| list.attempts)
    }

    /// Gathers the attempt records for `level`.
    pub fn query_attempts_for_level(&self, level: u32) -> StoreResult<Vec<models::AttemptRecord>> {
        Ok(self.query_attempts()?
            .into_iter()
            .filter(|attempt| attempt.level == level)
            .collect())
    }

    /// Counts one more finished play-through of `level` by `user_id`.
    ///
    /// Creates the (user, level) record on first use. Returns the updated record.
    pub fn record_attempt(
        &self,
        user_id: u32,
        level: u32,
        kind: AttemptKind,
    ) -> StoreResult<models::AttemptRecord> {
        log::trace!("[record_attempt] Recording {kind:?} for user {user_id} on level {level}...");

        let mut list = self.load::<schema::AttemptList>(schema::ATTEMPTS_FILE)?;
        let next_id = list.attempts.len() as u32 + 1;

        let index = match list.attempts
            .iter()
            .position(|a| a.user_id == user_id && a.level == level)
        {
            Some(index) => index,
            None => {
                list.attempts.push(models::AttemptRecord::new(next_id, user_id, level));
                list.attempts.len() - 1
            }
        };

        let record = &mut list.attempts[index];
        record.increment(kind, Utc::now().timestamp());
        let record = record.clone();

        self.save(schema::ATTEMPTS_FILE, &list)?;

        log::info!(
            "Attempt recorded: user {user_id}, level {level}, attempt #{} \
             ({} victories, {} game overs)",
            record.attempt, record.victory_attempts, record.gameover_attempts
        );
        Ok(record)
    }
}
