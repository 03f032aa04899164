mod engine;
mod state;

pub use engine::{Engine, StateObserver};
pub use state::AppState;
