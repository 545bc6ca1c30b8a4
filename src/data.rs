//! Guest-list data: records, filter predicates and sources.

mod guest;
mod predicate;
pub mod source;
mod value;

pub use guest::GuestRecord;
pub use predicate::Predicate;
#[cfg(feature = "csv")]
pub use source::{CsvSource, CsvSourceConfig};
pub use source::DataSource;
pub use value::Value;
