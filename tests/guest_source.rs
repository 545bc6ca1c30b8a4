//! Guest-list reading and filtering.

#![cfg(feature = "csv")]

use convite::data::{CsvSource, CsvSourceConfig, DataSource, Predicate};

use std::fs;
use std::path::PathBuf;

fn write_guests(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("convite-{}-{name}.csv", std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

fn names(source: &mut CsvSource, filter: Option<Predicate>) -> Vec<String> {
    source
        .read(filter)
        .unwrap()
        .map(|r| r.unwrap().name())
        .collect()
}

#[test]
fn reads_every_record_without_a_filter() {
    let path = write_guests("all", "name,group\nMark,youth\nAna,band\nJo,youth\n");
    let mut source = CsvSource::open(CsvSourceConfig::default(), &path).unwrap();
    assert_eq!(names(&mut source, None), vec!["Mark", "Ana", "Jo"]);
}

#[test]
fn filter_keeps_matching_records() {
    let path = write_guests(
        "filtered",
        "name,group,age\nMark,youth,15\nAna,band,17\nJo,youth,14\n",
    );
    let filter = Predicate::from_string("group = 'youth' and age >= 15").unwrap();
    let mut source = CsvSource::open(CsvSourceConfig::default(), &path).unwrap();
    assert_eq!(names(&mut source, Some(filter)), vec!["Mark"]);
}

#[test]
fn custom_delimiter() {
    let path = write_guests("semicolon", "name;group\nMark;youth\n");
    let config = CsvSourceConfig {
        delimiter: ';',
        ..CsvSourceConfig::default()
    };
    let mut source = CsvSource::open(config, &path).unwrap();
    assert_eq!(names(&mut source, None), vec!["Mark"]);
}

#[test]
fn missing_file_is_an_open_error() {
    let missing = std::env::temp_dir().join("convite-no-such-guests.csv");
    assert!(CsvSource::open(CsvSourceConfig::default(), &missing).is_err());
}
