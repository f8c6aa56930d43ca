pub mod callouts;
pub mod continuation;
pub mod engine;
pub mod list_detection;
pub mod section_detection;
pub mod validation;

pub use engine::{BlockRule, RuleEngine, RuleOutput};
pub use validation::{ModelValidator, ValidationIssue, ValidationReport};
