pub mod executor;
pub mod extract;
pub mod matcher;
pub mod planner;
pub mod reconcile;
pub mod selection;
pub mod session;
pub mod validator;

pub use executor::BatchExecutor;
pub use extract::LineItemExtractor;
pub use reconcile::ReconcileService;
pub use selection::SelectionSet;
pub use session::{item_statuses, ReconcileSession};
