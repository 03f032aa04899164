pub mod config;
pub mod race;
pub mod states;
