use anyhow::Result;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::io::{AsyncBufReadExt, BufReader};

use std::io::Write;

use crate::config::Config;
use crate::quiz::LevelBank;
use crate::store::Store;

pub mod commands;
pub mod loading;
pub mod play;

use commands::Commands;
use play::PlaySession;

/// Who is at the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Guest,
    Student(u32),
    Admin(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The terminal front end: menus between levels, a [`PlaySession`] during one.
pub struct Shell {
    config: Config,
    store: Store,
    bank: LevelBank,

    session: Session,
    play: Option<PlaySession>,
    rng: StdRng,

    pending_loading: Option<&'static str>,
    quitting: bool,
}

impl Shell {
    pub fn new(config: Config, store: Store, bank: LevelBank) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        Self {
            config,
            store,
            bank,
            session: Session::Guest,
            play: None,
            rng,
            pending_loading: None,
            quitting: false,
        }
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn is_playing(&self) -> bool {
        self.play.is_some()
    }

    pub fn play_session(&self) -> Option<&PlaySession> {
        self.play.as_ref()
    }

    /// Handles one line of input, writing the reply (and any loading screen) to `out`.
    pub async fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let reply = match self.play.is_some() {
            true => self.play_input(line),
            false => Commands::run_command(self, line),
        };

        let response = reply.unwrap_or_else(|err| format!("Error: {err}"));
        if !response.is_empty() {
            writeln!(out, "{response}")?;
        }

        if let Some(destination) = self.pending_loading.take() {
            loading::show(out, self.config.loading, destination).await?;
        }

        Ok(if self.quitting { Flow::Quit } else { Flow::Continue })
    }

    fn start_level(&mut self, number: u32, user_id: u32) -> Result<String> {
        let level = self.bank
            .level(number)
            .ok_or_else(|| anyhow::anyhow!("No such level: {number}"))?
            .clone();
        if level.questions.is_empty() {
            log::warn!("[start_level] Level {number} has no questions.");
            return Err(anyhow::anyhow!("Level {number} has no questions."));
        }

        let seed = self.rng.random();
        let session = PlaySession::new(level, user_id, StdRng::seed_from_u64(seed), self.config.wave_size);
        let screen = session.render();
        self.play = Some(session);

        Ok(screen)
    }
}

/// Runs the game on stdin/stdout until `quit` or end of input.
pub async fn run_shell(config: Config, store: Store, bank: LevelBank) -> Result<()> {
    let mut out = std::io::stdout();
    let mut shell = Shell::new(config, store, bank);

    loading::show(&mut out, shell.config.loading, "Fruit Math").await?;
    writeln!(out, "{}", Commands::get_help())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else { break };
        if shell.handle_line(&line, &mut out).await? == Flow::Quit {
            break;
        }
    }

    log::info!("Shell closed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::LevelState;
    use crate::store::testing::ScratchStore;
    use std::time::Duration;

    fn shell_for(scratch: &ScratchStore) -> Shell {
        let config = Config {
            data_dir: scratch.store.root().to_path_buf(),
            loading: Duration::ZERO,
            seed: Some(7),
            ..Config::default()
        };
        Shell::new(config, scratch.store.clone(), LevelBank::builtin())
    }

    async fn send(shell: &mut Shell, line: &str) -> String {
        let mut out = Vec::new();
        shell.handle_line(line, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn current_answer(shell: &Shell) -> i64 {
        shell.play_session().unwrap().controller().get_current_answer().unwrap()
    }

    fn wrong_value(shell: &Shell) -> i64 {
        let answer = current_answer(shell);
        shell.play_session().unwrap().fruits().find(|f| f.value != answer).unwrap().value
    }

    async fn logged_in(scratch: &ScratchStore) -> Shell {
        let mut shell = shell_for(scratch);
        send(&mut shell, "register ana 9").await;
        send(&mut shell, "login ana").await;
        shell
    }

    #[tokio::test]
    async fn register_login_and_menu() {
        let scratch = ScratchStore::new();
        let mut shell = shell_for(&scratch);

        assert_eq!(send(&mut shell, "menu").await.trim(), "No user logged in.");

        let output = send(&mut shell, "register ana 9").await;
        assert!(output.contains("Account created successfully!"));
        assert!(output.contains("Login ready."));

        assert!(send(&mut shell, "register ana 9").await.contains("Error: Username already exists!"));
        assert!(send(&mut shell, "register ben nine").await.contains("Error: Age must be a valid number!"));
        assert!(send(&mut shell, "login nobody").await.contains("Error: Username Not Found!"));

        assert!(send(&mut shell, "login ana").await.contains("Login Successful!"));
        assert_eq!(shell.session(), Session::Student(1));
        assert!(send(&mut shell, "menu").await.contains("Welcome, ana\nCurrent Level: 1"));

        send(&mut shell, "logout").await;
        assert_eq!(shell.session(), Session::Guest);
    }

    #[tokio::test]
    async fn locked_levels_cannot_be_played() {
        let scratch = ScratchStore::new();
        let mut shell = logged_in(&scratch).await;

        let output = send(&mut shell, "play Level 3").await;
        assert!(output.contains("Error: Level 3 is locked. Your current level is 1."));
        assert!(!shell.is_playing());

        let levels = send(&mut shell, "levels").await;
        assert!(levels.contains("Level 2 (10 questions) (locked)"));
    }

    #[tokio::test]
    async fn winning_a_level_unlocks_the_next() {
        let scratch = ScratchStore::new();
        let mut shell = logged_in(&scratch).await;

        assert!(send(&mut shell, "play 1").await.contains("3 + 4 = ?"));

        let mut output = String::new();
        while shell.play_session().unwrap().controller().state() == LevelState::Playing {
            let answer = current_answer(&shell);
            output = send(&mut shell, &answer.to_string()).await;
        }
        assert!(output.contains("Level Complete!"));
        assert!(output.contains("Score: 10"));

        let attempts = scratch.store.query_attempts_for_level(1).unwrap();
        assert_eq!((attempts[0].victory_attempts, attempts[0].attempt), (1, 1));

        assert!(send(&mut shell, "next").await.contains("-3 + -7 = ?"));
        send(&mut shell, "menu").await;
        assert!(send(&mut shell, "menu").await.contains("Current Level: 2"));
        assert!(send(&mut shell, "leaderboard 1").await.contains("Rank 1: ana - 1 attempts"));
    }

    #[tokio::test]
    async fn three_wrong_slices_is_game_over() {
        let scratch = ScratchStore::new();
        let mut shell = logged_in(&scratch).await;
        send(&mut shell, "play 1").await;

        assert!(send(&mut shell, "99999").await.contains("No fruit with value 99999 on screen."));

        let mut output = String::new();
        for _ in 0..3 {
            let value = wrong_value(&shell);
            output = send(&mut shell, &value.to_string()).await;
        }
        assert!(output.contains("Game Over!"));

        let attempts = scratch.store.query_attempts_for_level(1).unwrap();
        assert_eq!(attempts[0].gameover_attempts, 1);
        assert_eq!(scratch.store.query_user(1).unwrap().unwrap().current_level, 1);

        assert!(send(&mut shell, "next").await.contains("Error: Finish this level first."));
        assert!(send(&mut shell, "replay").await.contains("Lives: ♥♥♥"));
    }

    #[tokio::test]
    async fn finishing_every_level_is_reported() {
        let scratch = ScratchStore::new();
        let mut shell = logged_in(&scratch).await;
        scratch.store.update_user_level(1, 20).unwrap();

        send(&mut shell, "play 20").await;
        while shell.play_session().unwrap().controller().state() == LevelState::Playing {
            let answer = current_answer(&shell);
            send(&mut shell, &answer.to_string()).await;
        }

        assert_eq!(send(&mut shell, "next").await.trim(), "Completed All Level");
        assert!(!shell.is_playing());
        assert!(send(&mut shell, "menu").await.contains("Welcome, ana\nCompleted All Level"));
    }

    #[tokio::test]
    async fn levels_without_questions_are_not_started() {
        let scratch = ScratchStore::new();
        let bank: LevelBank = serde_json::from_str(r#"{"levels":[{"number":1,"questions":[]}]}"#).unwrap();
        let config = Config { loading: Duration::ZERO, seed: Some(7), ..Config::default() };
        let mut shell = Shell::new(config, scratch.store.clone(), bank);
        send(&mut shell, "register ana 9").await;
        send(&mut shell, "login ana").await;

        assert!(send(&mut shell, "play 1").await.contains("Error: Level 1 has no questions."));
        assert!(!shell.is_playing());
    }

    #[tokio::test]
    async fn paused_levels_ignore_input() {
        let scratch = ScratchStore::new();
        let mut shell = logged_in(&scratch).await;
        send(&mut shell, "play 1").await;

        assert!(send(&mut shell, "pause").await.contains("Paused."));
        let answer = current_answer(&shell);
        assert!(send(&mut shell, &answer.to_string()).await.contains("The game is paused."));
        assert_eq!(shell.play_session().unwrap().controller().score(), 0);

        send(&mut shell, "resume").await;
        assert!(send(&mut shell, &answer.to_string()).await.contains("Correct!"));
    }

    #[tokio::test]
    async fn teacher_commands_need_an_admin_login() {
        let scratch = ScratchStore::new();
        let mut shell = logged_in(&scratch).await;

        assert!(send(&mut shell, "users").await.contains("only available to teachers"));
        assert!(send(&mut shell, "admin admin wrong").await.contains("Invalid Username or Password!"));

        send(&mut shell, "admin admin admin").await;
        assert_eq!(shell.session(), Session::Admin(1));
        assert!(send(&mut shell, "users").await.contains("**Player:** ana"));
        assert!(send(&mut shell, "attempts 1").await.contains("No attempts yet."));
    }

    #[tokio::test]
    async fn unknown_and_malformed_commands() {
        let scratch = ScratchStore::new();
        let mut shell = shell_for(&scratch);

        assert!(send(&mut shell, "dance").await.contains("No such command found: dance"));
        assert!(send(&mut shell, "$$$").await.contains("Invalid command syntax."));
        assert!(send(&mut shell, "top").await.contains("Expected usage: `top <level>`"));

        let mut out = Vec::new();
        assert_eq!(shell.handle_line("quit", &mut out).await.unwrap(), Flow::Quit);
    }
}
