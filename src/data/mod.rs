pub mod loader;
pub mod record;

pub use loader::{load_results, REQUIRED_COLUMNS};
pub use record::{parse_date, ResultRow, ResultsTable};
