use anyhow::{Result, anyhow};
use itertools::Itertools;
use rand::rngs::StdRng;

use crate::models::{Level, STARTING_LIVES};
use crate::quiz::{Fruit, LevelController, LevelState, SliceOutcome, Spawner};
use crate::shell::{Session, Shell};

/// One level on screen: the controller plus the fruit currently flying.
pub struct PlaySession {
    controller: LevelController,
    spawner: Spawner<StdRng>,
    wave: Vec<Fruit>,
}

impl PlaySession {
    pub fn new(level: Level, user_id: u32, rng: StdRng, wave_size: usize) -> Self {
        let mut session = Self {
            controller: LevelController::new(level, user_id),
            spawner: Spawner::new(rng, wave_size),
            wave: Vec::new(),
        };
        session.respawn();
        session
    }

    pub fn controller(&self) -> &LevelController {
        &self.controller
    }

    /// Fruits still waiting to be sliced.
    pub fn fruits(&self) -> impl Iterator<Item = &Fruit> {
        self.wave.iter().filter(|fruit| !fruit.is_sliced())
    }

    fn respawn(&mut self) {
        self.wave = match self.controller.get_current_answer() {
            Some(answer) if !self.controller.state().is_finished() => self.spawner.wave(answer),
            _ => Vec::new(),
        };
    }

    fn replay(&mut self) {
        self.controller = self.controller.replay();
        self.respawn();
    }

    pub fn render(&self) -> String {
        let hearts = "♥".repeat(self.controller.lives() as usize)
            + &"♡".repeat(STARTING_LIVES.saturating_sub(self.controller.lives()) as usize);
        let header = format!(
            "**Level {}** | Score: {} | Lives: {hearts}",
            self.controller.level_number(),
            self.controller.score()
        );

        match self.controller.state() {
            LevelState::Victory => format!(
                "{header}\nLevel Complete!\n`next`: next level, `replay`: play again, `menu`: back to menu"
            ),
            LevelState::GameOver => format!(
                "{header}\nGame Over!\n`replay`: try again, `menu`: back to menu"
            ),
            LevelState::Paused => format!("{header}\nPaused. Type `resume` to continue."),
            LevelState::Playing => format!(
                "{header}\n{}\n{}\nType a fruit's number to slice it.",
                self.controller.current_question().unwrap_or_default(),
                self.fruits().join(" "),
            ),
        }
    }
}

/// Input handling while a level is on screen.
impl Shell {
    pub(super) fn play_input(&mut self, input: &str) -> Result<String> {
        let session = self.play.as_mut().ok_or_else(|| anyhow!("No level in progress."))?;

        if let Ok(value) = input.parse::<i64>() {
            return self.slice(value);
        }

        let result = match input.to_lowercase().as_str() {
            "pause" => {
                if !session.controller.pause() {
                    return Err(anyhow!("The level is not running."));
                }
                session.render()
            }
            "resume" => {
                if !session.controller.resume() {
                    return Err(anyhow!("The level is not paused."));
                }
                session.render()
            }
            "replay" => {
                session.replay();
                session.render()
            }
            "next" => {
                if session.controller.state() != LevelState::Victory {
                    return Err(anyhow!("Finish this level first."));
                }
                let next = session.controller.level_number() + 1;
                let user_id = session.controller.user_id();
                if self.bank.level(next).is_none() {
                    self.play = None;
                    return Ok(String::from("Completed All Level"));
                }
                self.start_level(next, user_id)?
            }
            "menu" | "quit" | "exit" => {
                self.play = None;
                match self.session {
                    Session::Student(_) => String::from("Back to the menu. Type `menu` to see your progress."),
                    _ => String::from("Back to the menu."),
                }
            }
            "help" => String::from(
                "Type a fruit's number to slice it. Other commands: `pause`, `resume`, `replay`, `next`, `menu`."
            ),
            other => return Err(anyhow!("Unknown input during play: {other}")),
        };

        Ok(result)
    }

    fn slice(&mut self, value: i64) -> Result<String> {
        let session = self.play.as_mut().ok_or_else(|| anyhow!("No level in progress."))?;

        if session.controller.state() == LevelState::Paused {
            return Ok(String::from("The game is paused. Type `resume` to continue."));
        }
        if session.controller.state().is_finished() {
            return Ok(session.render());
        }

        let Some(fruit) = session.wave.iter_mut().find(|f| !f.is_sliced() && f.value == value) else {
            return Ok(format!("No fruit with value {value} on screen."));
        };
        let kind = fruit.kind;

        let message = match fruit.slice(&mut session.controller) {
            SliceOutcome::Correct { .. } => {
                session.respawn();
                format!("Correct! The {kind} was {value}.")
            }
            SliceOutcome::Wrong { lives } => {
                format!("Wrong! The {kind} was {value}. {lives} {} left.",
                    if lives == 1 { "life" } else { "lives" })
            }
            SliceOutcome::LevelComplete { .. } | SliceOutcome::GameOver => {
                session.respawn();
                match session.controller.persist(&self.store) {
                    Ok(_) => String::new(),
                    Err(err) => {
                        log::error!("[slice] Could not save progress: {err}");
                        format!("Error: could not save progress: {err}")
                    }
                }
            }
            SliceOutcome::Ignored => String::new(),
        };

        let screen = session.render();
        Ok([message, screen].into_iter().filter(|s| !s.is_empty()).join("\n"))
    }
}
