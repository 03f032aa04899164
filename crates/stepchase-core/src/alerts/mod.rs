mod alert;
mod center;

pub use alert::{Alert, Severity};
pub use center::{AlertCenter, SubscriptionId};
