pub mod dashboard;
pub mod render;

pub use dashboard::{Action, Dashboard, Outcome};
