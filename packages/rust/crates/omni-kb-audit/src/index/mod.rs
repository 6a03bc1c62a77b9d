//! Index loading: CSV manifest → ordered [`FragmentRecord`] rows.

mod loader;
mod record;

pub use loader::{LoadedIndex, REQUIRED_COLUMNS, load_index, load_index_file};
pub use record::{FragmentRecord, parse_tags};
