pub mod catalog;
pub mod line_item;
pub mod outcome;
pub mod plan;
pub mod validation;

pub use catalog::{normalize_name, CatalogEntry, CatalogSnapshot, NewProduct};
pub use line_item::{parse_rate, LineItem, RawLineItem, RawRate};
pub use outcome::{EntryOutcome, OutcomeReport, OutcomeStatus};
pub use plan::{MergePolicy, PlanEntry, WriteOp, WritePlan};
pub use validation::{ItemStatus, ValidationResult};
