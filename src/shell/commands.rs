use crate::leaderboard;
use crate::models::FINAL_LEVEL;
use crate::shell::{Session, Shell};

use anyhow::{Context, Result, anyhow};
use itertools::Itertools;
use regex::Regex;

use std::sync::LazyLock;

const MAX_CMD_LENGTH: usize = 12;

static VALID_CMD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("command pattern is valid")
});

struct CommandInstance<'a> {
    shell: &'a mut Shell,

    command: &'a str,
    parameters: &'a [&'a str],
}

pub struct Commands;
impl Commands {
    pub fn run_command(shell: &mut Shell, input: &str) -> Result<String> {
        // Split the input (on whitespace) into:
        // - The command (first token)
        // - Its parameters (all tokens afterwards)
        let split_tokens = input.split_whitespace().collect::<Vec<_>>();
        let Some((&command, parameters)) = split_tokens.split_first() else {
            return Ok(String::new());
        };

        let command_lower = command.to_lowercase();
        let mut cmd = CommandInstance { shell, command, parameters };

        // Execute the command
        let result: String = match command_lower.as_str() {
              "register" => cmd.register()?,
                 "login" => cmd.login()?,
                 "admin" => cmd.admin()?,
                "logout" => cmd.logout(),
                  "menu" => cmd.menu()?,
                "levels" => cmd.levels()?,
                  "play" => cmd.play()?,
           "leaderboard" => cmd.leaderboard()?,
                   "top" => cmd.top()?,
              "attempts" => cmd.attempts()?,
                 "users" => cmd.users()?,
                  "help" => Self::get_help(),
            "quit" | "exit" => cmd.quit(),
            _ => {
                if Commands::is_valid_cmd(command) {
                    log::info!("User submitted unknown command: {}", command);
                    return Err(anyhow!("No such command found: {}, see `help` for commands.", command));
                } else {
                    log::info!("User submitted invalid command: {}", command);
                    return Err(anyhow!("Invalid command syntax."));
                }
            }
        };

        Ok(result)
    }

    /// Ensures that the string slice conforms to C-like identifier regex
    fn is_valid_cmd(s: &str) -> bool {
        s.len() <= MAX_CMD_LENGTH && VALID_CMD.is_match(s)
    }

    /// Gets a help string. Should be updated after a new command is added
    pub fn get_help() -> String {
        String::from(
r#"
**Command List:**
`register <username> <age>`:  Create a player account.
`login <username>`:  Log in as a player.
`admin <username> <password>`:  Log in as a teacher.
`logout`:  Log out.
`menu`:  Show your progress.
`levels`:  List levels and which are unlocked.
`play <level>`:  Play an unlocked level.
`leaderboard <level>`:  Players who beat a level, fewest attempts first.
`top <level>`:  Top 10 attempt counts for a level.
`attempts <level>`:  (teacher) Every player's attempts on a level.
`users`:  (teacher) List registered players.
`help`:  Get information on supported commands
`quit`:  Leave the game.
"#)
    }
}

impl CommandInstance<'_> {
    fn register(&mut self) -> Result<String> {
        let usage = "Expected usage: `register <username> <age>`";
        let username = self.parameters.first().context(usage)?;
        let age = self.parameters.get(1).context(usage)?;

        let age: i64 = age
            .parse()
            .map_err(|_| anyhow!("Age must be a valid number!"))
            .inspect_err(|_| log::warn!("Age is not a valid number: {age}"))?;

        self.shell.store.register_user(username, age)?;

        self.shell.pending_loading = Some("Login");
        Ok(String::from("Account created successfully!"))
    }

    fn login(&mut self) -> Result<String> {
        let username = self.parameters
            .first()
            .context("Username cannot be empty!")?;

        let user = self.shell.store
            .query_user_by_name(username)?
            .context("Username Not Found!")?;

        self.shell.session = Session::Student(user.id);
        self.shell.pending_loading = Some("Menu");
        log::info!("User {} logged in.", user.username);

        Ok(String::from("Login Successful!"))
    }

    fn admin(&mut self) -> Result<String> {
        let (Some(username), Some(password)) = (self.parameters.first(), self.parameters.get(1)) else {
            return Err(anyhow!("Username and Password cannot be empty!"));
        };

        let admin = self.shell.store
            .authenticate_admin(username, password)?
            .context("Invalid Username or Password!")?;

        self.shell.session = Session::Admin(admin.id);
        self.shell.pending_loading = Some("Teacher Menu");
        log::info!("Admin {} logged in.", admin.username);

        Ok(String::from("Login Successful!"))
    }

    fn logout(&mut self) -> String {
        self.shell.session = Session::Guest;
        log::info!("Logged out successfully!");
        String::from("Logged out successfully!")
    }

    fn menu(&mut self) -> Result<String> {
        match self.shell.session {
            Session::Guest => Ok(String::from("No user logged in.")),
            Session::Admin(_) => Ok(String::from(
                "**Teacher Menu**\n\tUse `users`, `attempts <level>` or `leaderboard <level>`."
            )),
            Session::Student(id) => {
                let Some(user) = self.shell.store.query_user(id)? else {
                    log::error!("Logged-in user {id} not found in user data.");
                    return Ok(String::from("User not found!"));
                };

                let progress = if user.completed_all_levels() {
                    String::from("Completed All Level")
                } else {
                    format!("Current Level: {}", user.current_level)
                };
                Ok(format!("Welcome, {}\n{progress}", user.username))
            }
        }
    }

    fn levels(&mut self) -> Result<String> {
        let user = self.student()?;
        let current = user.current_level.min(FINAL_LEVEL);

        Ok(format!(
            "**Levels:**\n\t{}",
            self.shell.bank
                .levels()
                .iter()
                .map(|level| format!("{level} {}",
                    if level.number <= current { "" } else { "(locked)" }))
                .map(|line| line.trim_end().to_string())
                .join("\n\t")
        ))
    }

    fn play(&mut self) -> Result<String> {
        let level = self.level_parameter()?;
        let user = self.student()?;

        if !user.can_play(level) {
            return Err(anyhow!(
                "Level {level} is locked. Your current level is {}.", user.current_level
            ));
        }

        self.shell.start_level(level, user.id)
    }

    fn leaderboard(&mut self) -> Result<String> {
        let level = self.level_parameter()?;
        let users = self.shell.store.query_users()?;
        let attempts = self.shell.store.query_attempts()?;

        Ok(leaderboard::render(
            &format!("Leaderboard (Level {level})"),
            &leaderboard::student_rankings(&users, &attempts, level),
        ))
    }

    fn top(&mut self) -> Result<String> {
        let level = self.level_parameter()?;
        let users = self.shell.store.query_users()?;
        let attempts = self.shell.store.query_attempts()?;

        Ok(leaderboard::render(
            &format!("Top {} Leaderboard (Level {level})", leaderboard::TOP_LIMIT),
            &leaderboard::top_attempts(&users, &attempts, level),
        ))
    }

    fn attempts(&mut self) -> Result<String> {
        self.require_admin()?;
        let level = self.level_parameter()?;
        let users = self.shell.store.query_users()?;
        let attempts = self.shell.store.query_attempts()?;

        Ok(leaderboard::render(
            &format!("Attempts (Level {level})"),
            &leaderboard::admin_rankings(&users, &attempts, level),
        ))
    }

    fn users(&mut self) -> Result<String> {
        self.require_admin()?;
        let users = self.shell.store.query_users()?;

        if users.is_empty() {
            return Ok(String::from("No registered players."));
        }
        Ok(users.iter().join("\n"))
    }

    fn quit(&mut self) -> String {
        self.shell.quitting = true;
        String::from("Goodbye!")
    }

    /// The logged-in player's current record.
    fn student(&self) -> Result<crate::models::UserRecord> {
        let Session::Student(id) = self.shell.session else {
            return Err(anyhow!("Log in as a player first (`login <username>`)."));
        };

        self.shell.store
            .query_user(id)?
            .with_context(|| {
                log::error!("Logged-in user {id} not found in user data.");
                "User not found!"
            })
    }

    fn require_admin(&self) -> Result<()> {
        match self.shell.session {
            Session::Admin(_) => Ok(()),
            _ => Err(anyhow!("This command is only available to teachers (`admin <username> <password>`).")),
        }
    }

    /// Reads a level from the parameters: either `7` or `Level 7`.
    fn level_parameter(&self) -> Result<u32> {
        leaderboard::parse_level_label(&self.parameters.join(" "))
            .with_context(|| format!("Expected usage: `{} <level>`", self.command))
    }
}
