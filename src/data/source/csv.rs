//! CSV guest lists.

use crate::data::{DataSource, GuestRecord, Predicate};
use crate::error::{Error, Result};

use itertools::Itertools;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Copy, Clone)]
pub struct CsvSourceConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_header")]
    pub header: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_header() -> bool {
    true
}

impl Default for CsvSourceConfig {
    fn default() -> Self {
        CsvSourceConfig {
            delimiter: default_delimiter(),
            header: default_header(),
        }
    }
}

pub struct CsvSource {
    reader: csv::Reader<std::fs::File>,
}

impl CsvSource {
    pub fn open(config: CsvSourceConfig, path: impl AsRef<Path>) -> Result<CsvSource> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .delimiter(config.delimiter as u8)
            .has_headers(config.header)
            .from_path(path)
            .map_err(|e| Error::source_open(path, e))?;
        Ok(Self { reader })
    }
}

impl DataSource for CsvSource {
    fn read(
        &mut self,
        filter: Option<Predicate>,
    ) -> Result<Box<dyn Iterator<Item = Result<GuestRecord>> + '_>> {
        let records = self
            .reader
            .deserialize::<GuestRecord>()
            .map(|r| r.map_err(Error::record_read));

        match filter {
            Some(filter) => Ok(Box::new(records.filter_ok(move |guest| filter.eval(guest)))),
            None => Ok(Box::new(records)),
        }
    }
}
