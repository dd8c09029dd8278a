mod answers;
mod instructor;

pub use answers::{Consistency, ConsistencyCheck, HealthAnswer, SummaryReport};
pub use instructor::Instructor;
