//! Various unsorted logical operators.

pub use self::select::{insertion_sort_by_key, partition_nth, DEFAULT_INSERTION_THRESHOLD};
pub use self::sort::sort3;

mod select;
mod sort;
