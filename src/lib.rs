pub mod config;
pub mod leaderboard;
pub mod models;
pub mod quiz;
pub mod shell;
pub mod store;
