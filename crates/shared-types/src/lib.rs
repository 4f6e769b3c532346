pub mod summary;
pub mod types;

pub use summary::BatchSummary;
pub use types::{DocumentType, FormFields, ValidationResult, ValidationStatus};
