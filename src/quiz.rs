pub mod bank;
pub mod controller;
pub mod eval;
pub mod spawner;

pub use bank::{BankIssue, LevelBank};
pub use controller::{LevelController, LevelState, SliceOutcome};
pub use spawner::{Fruit, FruitKind, Spawner};
