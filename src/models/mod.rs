pub mod attempt;
pub mod gym;
pub mod problem;
pub mod session;

pub use attempt::{Attempt, Outcome};
pub use gym::{Gym, GymGrade};
pub use problem::{Problem, ProblemStatus};
pub use session::{Energy, Session};
