mod date;
pub mod deadline;
mod delay;
mod shared;
mod task;
mod timeout_notification;
mod user;

pub use date::TimeOfDay;
pub use deadline::{deadlines, TaskDeadlines};
pub use delay::Delay;
pub use shared::entity::{Entity, ID};
pub use task::{Assignees, Task, TaskFrequency, TaskSchedule};
pub use timeout_notification::TimeoutNotification;
pub use user::User;
