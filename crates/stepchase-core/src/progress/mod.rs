mod model;
mod nessie;
mod thresholds;

pub use model::ProgressModel;
pub use nessie::Nessie;
pub use thresholds::{
    percent_of_goal, proximity, Milestone, ProximityMilestone, StepMilestone, Tracker,
};
