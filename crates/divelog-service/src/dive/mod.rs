pub mod enrich;
pub mod submission;
pub mod validation;
pub mod workflow;

pub use enrich::{Coordinates, DiveEnricher, ResolvedMetadata};
pub use submission::{DiveDateInput, DiveSubmission, SubmissionError};
pub use validation::{FieldError, ValidationErrors};
pub use workflow::{DiveUpsertWorkflow, UpsertedDive};
