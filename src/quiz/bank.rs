use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use std::fs;
use std::path::Path;

use crate::models::{Level, Question};
use crate::quiz::eval;

type RawLevel = (u32, &'static [(&'static str, i64)]);

/// The levels shipped with the game, easiest first.
const BUILTIN_LEVELS: &[RawLevel] = &[
    (1, &[
        ("3 + 4 = ?", 7), ("5 + 2 = ?", 7), ("6 + 3 = ?", 9), ("8 + 1 = ?", 9),
        ("2 + 7 = ?", 9), ("4 + 4 = ?", 8), ("9 + 5 = ?", 14), ("7 + 6 = ?", 13),
        ("10 + 3 = ?", 13), ("12 + 8 = ?", 20),
    ]),
    (2, &[
        ("-3 + -7 = ?", -10), ("-5 + -4 = ?", -9), ("-6 + -9 = ?", -15), ("-8 + -3 = ?", -11),
        ("-10 + -5 = ?", -15), ("-7 + -2 = ?", -9), ("-4 + -6 = ?", -10), ("-11 + -8 = ?", -19),
        ("-12 + -3 = ?", -15), ("-9 + -10 = ?", -19),
    ]),
    (3, &[
        ("8 + -3 = ?", 5), ("-6 + 9 = ?", 3), ("10 + -5 = ?", 5), ("-8 + 4 = ?", -4),
        ("5 + -7 = ?", -2), ("-12 + 6 = ?", -6), ("11 + -9 = ?", 2), ("-5 + 8 = ?", 3),
        ("6 + -2 = ?", 4), ("-4 + 7 = ?", 3),
    ]),
    (4, &[
        ("-2 + 5 + -3 = ?", 0), ("7 + -4 + 3 = ?", 6), ("-10 + 8 + -1 = ?", -3),
        ("12 + -5 + -7 = ?", 0), ("-8 + 6 + 4 = ?", 2), ("9 + -3 + -5 = ?", 1),
        ("-6 + 11 + -2 = ?", 3), ("4 + -7 + 5 = ?", 2), ("-9 + 12 + -6 = ?", -3),
        ("10 + -2 + -1 = ?", 7),
    ]),
    (5, &[
        ("3 + -7 + 5 + -2 = ?", -1), ("-8 + 9 + -3 + 4 = ?", 2), ("11 + -4 + -6 + 2 = ?", 3),
        ("-10 + 6 + 3 + -5 = ?", -6), ("8 + -5 + -2 + 7 = ?", 8), ("-7 + 11 + -9 + 5 = ?", 0),
        ("4 + -2 + -1 + 6 = ?", 7), ("-6 + 12 + -4 + 3 = ?", 5), ("9 + -8 + 7 + -3 = ?", 5),
        ("-5 + 8 + -2 + -1 = ?", 0),
    ]),
    (6, &[
        ("2 + -5 + 7 + -3 + 1 = ?", 2), ("-4 + 6 + -2 + 8 + -5 = ?", 3),
        ("10 + -7 + -6 + 4 + 5 = ?", 6), ("-9 + 3 + -1 + 5 + -4 = ?", -6),
        ("7 + -8 + 2 + -6 + 9 = ?", 4), ("-3 + -3 + 10 + -2 + 1 = ?", 3),
        ("5 + 6 + -12 + 4 + -8 = ?", -5), ("-11 + 7 + 2 + -1 + 6 = ?", 3),
        ("8 + -2 + -9 + 3 + -7 = ?", -7), ("-6 + 12 + -5 + 1 + 4 = ?", 6),
    ]),
    (7, &[
        ("-10 - (-5) = ?", -5), ("-15 - (-3) = ?", -12), ("-20 - (-8) = ?", -12),
        ("-30 - (-10) = ?", -20), ("-25 - (-7) = ?", -18), ("-18 - (-6) = ?", -12),
        ("-12 - (-4) = ?", -8), ("-28 - (-9) = ?", -19), ("-14 - (-2) = ?", -12),
        ("-22 - (-11) = ?", -11),
    ]),
    (8, &[
        ("5 - 9 = ?", -4), ("-6 - 4 = ?", -10), ("7 - (-3) = ?", 10), ("-8 - 5 = ?", -13),
        ("12 - 15 = ?", -3), ("4 - (-9) = ?", 13), ("-10 - 7 = ?", -17), ("3 - 11 = ?", -8),
        ("15 - (-6) = ?", 21), ("-2 - 14 = ?", -16),
    ]),
    (9, &[
        ("-5 - 7 - (-2) = ?", -10), ("10 - (-6) - 4 = ?", 12), ("-20 - 3 - (-9) = ?", -14),
        ("15 - (-8) - 5 = ?", 18), ("-12 - (-4) - (-3) = ?", -5), ("25 - 6 - (-7) = ?", 26),
        ("-30 - (-10) - 12 = ?", -32), ("40 - (-9) - 6 = ?", 43),
        ("-50 - (-15) - (-5) = ?", -30), ("35 - 8 - (-11) = ?", 38),
    ]),
    (10, &[
        ("-4 - (-6) - 3 - 2 = ?", -3), ("8 - (-5) - (-7) - 4 = ?", 16),
        ("-12 - 10 - (-3) - 6 = ?", -25), ("15 - (-9) - 5 - (-2) = ?", 21),
        ("20 - 8 - (-6) - (-4) = ?", 22), ("30 - (-12) - (-8) - 5 = ?", 45),
        ("-35 - 7 - (-11) - (-6) = ?", -25), ("25 - (-9) - (-4) - 2 = ?", 36),
        ("-45 - (-20) - 15 - (-3) = ?", -37), ("40 - 6 - (-7) - (-2) = ?", 43),
    ]),
    (11, &[
        ("1 x 3 = ?", 3), ("4 x 7 = ?", 28), ("2 x 9 = ?", 18), ("6 x 5 = ?", 30),
        ("8 x 2 = ?", 16), ("3 x 6 = ?", 18), ("7 x 4 = ?", 28), ("9 x 1 = ?", 9),
        ("5 x 8 = ?", 40), ("7 x 3 = ?", 21),
    ]),
    (12, &[
        ("2 x 3 x 4 = ?", 24), ("5 x 2 x 3 = ?", 30), ("3 x 3 x 2 = ?", 18),
        ("4 x 5 x 2 = ?", 40), ("6 x 2 x 2 = ?", 24), ("7 x 1 x 5 = ?", 35),
        ("2 x 2 x 9 = ?", 36), ("3 x 4 x 3 = ?", 36), ("8 x 3 x 1 = ?", 24),
        ("5 x 5 x 2 = ?", 50),
    ]),
    (13, &[
        ("-3 × -4 = ?", 12), ("-6 × -2 = ?", 12), ("-5 × -7 = ?", 35), ("-8 × -3 = ?", 24),
        ("-9 × -4 = ?", 36), ("-2 × -11 = ?", 22), ("-7 × -6 = ?", 42), ("-4 × -5 = ?", 20),
        ("-10 × -3 = ?", 30), ("-12 × -2 = ?", 24),
    ]),
    (14, &[
        ("6 × -3 = ?", -18), ("-7 × 5 = ?", -35), ("8 × -4 = ?", -32), ("-9 × 2 = ?", -18),
        ("4 × -6 = ?", -24), ("-5 × 9 = ?", -45), ("3 × -7 = ?", -21), ("-8 × 6 = ?", -48),
        ("7 × -2 = ?", -14), ("-2 × 8 = ?", -16),
    ]),
    (15, &[
        ("-2 × 3 × -4 = ?", 24), ("5 × -2 × 3 = ?", -30), ("-3 × -3 × -2 = ?", -18),
        ("4 × -1 × -6 = ?", 24), ("-5 × 2 × 2 = ?", -20), ("-7 × -2 × 3 = ?", 42),
        ("6 × -3 × -1 = ?", 18), ("-4 × -4 × -2 = ?", -32), ("3 × 5 × -2 = ?", -30),
        ("-6 × 2 × -3 = ?", 36),
    ]),
    (16, &[
        ("12 ÷ 3 = ?", 4), ("20 ÷ 5 = ?", 4), ("36 ÷ 6 = ?", 6), ("45 ÷ 9 = ?", 5),
        ("56 ÷ 8 = ?", 7), ("81 ÷ 9 = ?", 9), ("24 ÷ 4 = ?", 6), ("63 ÷ 7 = ?", 9),
        ("100 ÷ 10 = ?", 10), ("72 ÷ 8 = ?", 9),
    ]),
    (17, &[
        ("−24 ÷ −6 = ?", 4), ("−35 ÷ −5 = ?", 7), ("−48 ÷ −8 = ?", 6), ("−18 ÷ −3 = ?", 6),
        ("−90 ÷ −9 = ?", 10), ("−56 ÷ −7 = ?", 8), ("−42 ÷ −6 = ?", 7), ("−27 ÷ −9 = ?", 3),
        ("−64 ÷ −8 = ?", 8), ("−121 ÷ −11 = ?", 11),
    ]),
    (18, &[
        ("45 ÷ −5 = ?", -9), ("−72 ÷ 8 = ?", -9), ("−81 ÷ 9 = ?", -9), ("64 ÷ −4 = ?", -16),
        ("−96 ÷ 12 = ?", -8), ("55 ÷ −11 = ?", -5), ("−84 ÷ 7 = ?", -12), ("36 ÷ −6 = ?", -6),
        ("−108 ÷ 9 = ?", -12), ("48 ÷ −8 = ?", -6),
    ]),
    (19, &[
        ("−6 × 4 ÷ 3 = ?", -8), ("36 ÷ −9 × 5 = ?", -20), ("−8 × −3 ÷ 6 = ?", 4),
        ("50 ÷ −10 × −3 = ?", 15), ("7 × −6 ÷ −2 = ?", 21), ("−72 ÷ 8 × 2 = ?", -18),
        ("−5 × 12 ÷ −3 = ?", 20), ("96 ÷ −12 × −4 = ?", 32), ("−4 × −7 ÷ −2 = ?", -14),
        ("−60 ÷ −5 × −1 = ?", -12),
    ]),
    (20, &[
        ("−5 + 3 × 2 − (−4) ÷ 2 = ?", 3), ("20 ÷ −5 + (−6) × 3 + 4 = ?", -18),
        ("−7 + 4 × −2 + 6 ÷ −3 = ?", -17), ("−10 × 3 ÷ −5 + 6 − 2 = ?", 10),
        ("16 + (−8) × 2 ÷ 4 − 3 = ?", 9), ("18 − 9 × −2 + (−12) ÷ 3 = ?", 32),
        ("−12 + 10 ÷ −5 × 4 − 1 = ?", -21), ("24 ÷ −8 + 6 × −3 + 5 = ?", -16),
        ("−15 + (−5) × 4 ÷ 2 + 6 = ?", -19), ("14 − (−7) ÷ −1 × 2 + 3 = ?", 3),
    ]),
];

/// A problem found while checking a bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankIssue {
    EmptyLevel(u32),
    DuplicateLevel(u32),
    Unparsable { level: u32, prompt: String, reason: String },
    WrongAnswer { level: u32, prompt: String, expected: i64, recorded: i64 },
}

impl std::fmt::Display for BankIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BankIssue::EmptyLevel(level) => write!(f, "level {level} has no questions"),
            BankIssue::DuplicateLevel(level) => write!(f, "level {level} is defined twice"),
            BankIssue::Unparsable { level, prompt, reason } =>
                write!(f, "level {level}: cannot evaluate '{prompt}': {reason}"),
            BankIssue::WrongAnswer { level, prompt, expected, recorded } =>
                write!(f, "level {level}: '{prompt}' is {expected}, answer key says {recorded}"),
        }
    }
}

/// Every playable level, ordered by number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBank {
    levels: Vec<Level>,
}

impl LevelBank {
    pub fn builtin() -> Self {
        let levels = BUILTIN_LEVELS
            .iter()
            .map(|(number, questions)| Level {
                number: *number,
                questions: questions
                    .iter()
                    .map(|(prompt, answer)| Question::new(*prompt, *answer))
                    .collect(),
            })
            .collect();

        Self { levels }
    }

    /// Reads a bank from a JSON file shaped like `{"levels": [{"number": 1, "questions": [...]}]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read level file {}", path.display()))?;

        let mut bank: LevelBank = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed level file {}", path.display()))?;
        bank.levels.sort_by_key(|level| level.number);

        log::info!("Loaded {} levels from {}.", bank.levels.len(), path.display());
        Ok(bank)
    }

    pub fn level(&self, number: u32) -> Option<&Level> {
        self.levels.iter().find(|level| level.number == number)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Checks every answer key against its evaluated prompt.
    pub fn validate(&self) -> Vec<BankIssue> {
        let mut issues = self.levels
            .iter()
            .map(|level| level.number)
            .duplicates()
            .map(BankIssue::DuplicateLevel)
            .collect::<Vec<_>>();

        for level in &self.levels {
            if level.questions.is_empty() {
                issues.push(BankIssue::EmptyLevel(level.number));
            }

            for question in &level.questions {
                match eval::evaluate_prompt(&question.prompt) {
                    Ok(expected) if expected == question.answer => {}
                    Ok(expected) => issues.push(BankIssue::WrongAnswer {
                        level: level.number,
                        prompt: question.prompt.clone(),
                        expected,
                        recorded: question.answer,
                    }),
                    Err(err) => issues.push(BankIssue::Unparsable {
                        level: level.number,
                        prompt: question.prompt.clone(),
                        reason: err.to_string(),
                    }),
                }
            }
        }

        issues
    }
}
