pub mod config;
pub mod controller;
pub mod error;
pub mod prompt;
pub mod resource;

pub use controller::{Outcome, Selection, StudyController};
pub use error::{ControllerError, ResourceError};
pub use prompt::{LinePrompter, Prompter};
pub use resource::{HttpStudyResource, StudyResource};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
