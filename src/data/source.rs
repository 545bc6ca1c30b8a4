//! Guest-list data sources.

#[cfg(feature = "csv")]
mod csv;

#[cfg(feature = "csv")]
pub use crate::data::source::csv::{CsvSource, CsvSourceConfig};
use crate::data::{GuestRecord, Predicate};
use crate::error::Result;

/// Streams guest records, optionally filtered.
pub trait DataSource: Send {
    fn read(
        &mut self,
        filter: Option<Predicate>,
    ) -> Result<Box<dyn Iterator<Item = Result<GuestRecord>> + '_>>;
}
