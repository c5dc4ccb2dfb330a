pub mod cache;
pub mod loader;
pub mod types;

pub use cache::MatrixCache;
pub use loader::{load_matrix, parse_grid, RawCell, DEFAULT_HEADER_ROW};
pub use types::{CategoryRow, Choice, DecisionMatrix};
