use crate::models::{AttemptKind, AttemptRecord, Level, STARTING_LIVES};
use crate::store::{Store, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    Playing,
    Paused,
    GameOver,
    Victory,
}

impl LevelState {
    pub fn is_finished(self) -> bool {
        matches!(self, LevelState::GameOver | LevelState::Victory)
    }
}

/// What a single slice did to the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    Correct { score: u32 },
    Wrong { lives: u32 },
    LevelComplete { score: u32 },
    GameOver,
    /// The level is paused or already over.
    Ignored,
}

/// Quiz state for one play-through of a level by one user.
#[derive(Debug, Clone)]
pub struct LevelController {
    level: Level,
    user_id: u32,

    score: u32,
    question_index: usize,
    lives: u32,
    state: LevelState,

    persisted: bool,
}

impl LevelController {
    pub fn new(level: Level, user_id: u32) -> Self {
        log::info!("Starting {level} for user {user_id}.");
        Self {
            level,
            user_id,
            score: 0,
            question_index: 0,
            lives: STARTING_LIVES,
            state: LevelState::Playing,
            persisted: false,
        }
    }

    pub fn level(&self) -> &Level { &self.level }
    pub fn level_number(&self) -> u32 { self.level.number }
    pub fn user_id(&self) -> u32 { self.user_id }
    pub fn score(&self) -> u32 { self.score }
    pub fn lives(&self) -> u32 { self.lives }
    pub fn state(&self) -> LevelState { self.state }
    pub fn question_index(&self) -> usize { self.question_index }

    pub fn current_question(&self) -> Option<&str> {
        self.level.questions
            .get(self.question_index)
            .map(|question| question.prompt.as_str())
    }

    /// The answer to the question on screen, or `None` once the questions have run out.
    pub fn get_current_answer(&self) -> Option<i64> {
        let answer = self.level.questions
            .get(self.question_index)
            .map(|question| question.answer);

        if answer.is_none() {
            log::error!(
                "[get_current_answer] No valid answer available: index {} is out of bounds.",
                self.question_index
            );
        }
        answer
    }

    pub fn add_score(&mut self, amount: u32) {
        self.score += amount;
        log::debug!("Score updated: {}", self.score);
    }

    /// Moves to the next question. Running past the last one completes the level.
    pub fn display_next_question(&mut self) {
        self.question_index += 1;
        log::debug!("Question index updated: {}", self.question_index);

        if self.question_index >= self.level.questions.len() {
            self.state = LevelState::Victory;
            log::info!("All questions answered. {} complete!", self.level);
        }
    }

    /// Takes one life away. Losing the last one ends the level.
    pub fn lose_heart(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        log::debug!("Lives remaining: {}", self.lives);

        if self.lives == 0 {
            self.state = LevelState::GameOver;
            log::info!("Game Over on {}!", self.level);
        }
    }

    /// Reports a sliced fruit's value.
    pub fn slice(&mut self, value: i64) -> SliceOutcome {
        if self.state != LevelState::Playing {
            log::debug!("[slice] Ignoring slice of {value} while {:?}.", self.state);
            return SliceOutcome::Ignored;
        }

        let Some(answer) = self.get_current_answer() else {
            return SliceOutcome::Ignored;
        };

        if value == answer {
            log::debug!("Correct fruit sliced. Updating score and displaying the next question...");
            self.add_score(1);
            self.display_next_question();

            match self.state {
                LevelState::Victory => SliceOutcome::LevelComplete { score: self.score },
                _ => SliceOutcome::Correct { score: self.score },
            }
        } else {
            log::debug!("Wrong fruit sliced. Fruit value: {value}, Expected: {answer}");
            self.lose_heart();

            match self.state {
                LevelState::GameOver => SliceOutcome::GameOver,
                _ => SliceOutcome::Wrong { lives: self.lives },
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state != LevelState::Playing {
            return false;
        }
        self.state = LevelState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != LevelState::Paused {
            return false;
        }
        self.state = LevelState::Playing;
        true
    }

    /// A fresh play-through of the same level for the same user.
    pub fn replay(&self) -> Self {
        Self::new(self.level.clone(), self.user_id)
    }

    /// Writes the result of a finished level.
    ///
    /// Game over counts a game-over attempt. Victory counts a victory attempt and unlocks
    /// the next level. Does nothing while the level is running or once it has been written.
    pub fn persist(&mut self, store: &Store) -> StoreResult<Option<AttemptRecord>> {
        let kind = match self.state {
            LevelState::GameOver => AttemptKind::GameOver,
            LevelState::Victory => AttemptKind::Victory,
            _ => return Ok(None),
        };
        if self.persisted {
            return Ok(None);
        }
        self.persisted = true;

        let record = store.record_attempt(self.user_id, self.level.number, kind)?;
        if kind == AttemptKind::Victory {
            store.update_user_level(self.user_id, self.level.number + 1)?;
        }

        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;
    use crate::store::testing::ScratchStore;

    fn two_question_level() -> Level {
        Level {
            number: 2,
            questions: vec![Question::new("-3 + -7 = ?", -10), Question::new("-5 + -4 = ?", -9)],
        }
    }

    #[test]
    fn correct_slices_advance_and_complete() {
        let mut controller = LevelController::new(two_question_level(), 1);
        assert_eq!(controller.current_question(), Some("-3 + -7 = ?"));

        assert_eq!(controller.slice(-10), SliceOutcome::Correct { score: 1 });
        assert_eq!(controller.get_current_answer(), Some(-9));

        assert_eq!(controller.slice(-9), SliceOutcome::LevelComplete { score: 2 });
        assert_eq!(controller.state(), LevelState::Victory);
        assert_eq!(controller.get_current_answer(), None);
        assert_eq!(controller.slice(-9), SliceOutcome::Ignored);
    }

    #[test]
    fn three_wrong_slices_end_the_level() {
        let mut controller = LevelController::new(two_question_level(), 1);

        assert_eq!(controller.slice(4), SliceOutcome::Wrong { lives: 2 });
        assert_eq!(controller.slice(4), SliceOutcome::Wrong { lives: 1 });
        assert_eq!(controller.slice(-10), SliceOutcome::Correct { score: 1 });
        assert_eq!(controller.slice(4), SliceOutcome::GameOver);

        assert_eq!(controller.lives(), 0);
        assert_eq!(controller.score(), 1);
        assert_eq!(controller.slice(-9), SliceOutcome::Ignored);
    }

    #[test]
    fn paused_levels_ignore_slices() {
        let mut controller = LevelController::new(two_question_level(), 1);
        assert!(controller.pause());
        assert!(!controller.pause());
        assert_eq!(controller.slice(-10), SliceOutcome::Ignored);

        assert!(controller.resume());
        assert_eq!(controller.slice(-10), SliceOutcome::Correct { score: 1 });

        let fresh = controller.replay();
        assert_eq!((fresh.score(), fresh.lives(), fresh.question_index()), (0, 3, 0));
    }

    #[test]
    fn victory_unlocks_next_level_and_counts_attempt() {
        let scratch = ScratchStore::new();
        let user = scratch.store.register_user("ana", 9).unwrap();
        scratch.store.update_user_level(user.id, 2).unwrap();

        let mut controller = LevelController::new(two_question_level(), user.id);
        assert_eq!(controller.persist(&scratch.store).unwrap(), None);

        controller.slice(-10);
        controller.slice(-9);
        let record = controller.persist(&scratch.store).unwrap().unwrap();

        assert_eq!((record.level, record.victory_attempts, record.attempt), (2, 1, 1));
        assert_eq!(scratch.store.query_user(user.id).unwrap().unwrap().current_level, 3);

        // A second write is a no-op.
        assert_eq!(controller.persist(&scratch.store).unwrap(), None);
        assert_eq!(scratch.store.query_attempts().unwrap()[0].attempt, 1);
    }

    #[test]
    fn game_over_counts_attempt_without_unlocking() {
        let scratch = ScratchStore::new();
        let user = scratch.store.register_user("ben", 10).unwrap();

        let mut controller = LevelController::new(two_question_level(), user.id);
        for _ in 0..STARTING_LIVES {
            controller.slice(0);
        }
        let record = controller.persist(&scratch.store).unwrap().unwrap();

        assert_eq!((record.level, record.gameover_attempts), (2, 1));
        assert_eq!(scratch.store.query_user(user.id).unwrap().unwrap().current_level, 1);
    }
}
