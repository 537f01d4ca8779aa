pub mod config;
pub mod hackathon;
pub mod participation;
pub mod problem;
pub mod retry;
pub mod role;
pub mod time;
pub mod user;
pub mod validation;

pub use participation::{Participation, SelectedProblem, Solution, TimestampError};
pub use role::Role;
pub use validation::{SolutionField, SolutionForm, ValidatedSolution, ValidationError};
