//! csvrec-core: Core library for reading, writing and remapping delimited record files
//!
//! This library provides functionality to:
//! - Encode and decode individual field values (quoting rules)
//! - Model CSV files as a shared header plus per-row records
//! - Tokenize physical lines into logical records, including quoted
//!   fields spanning several lines
//! - Read and write record streams over pluggable line sources and sinks
//! - Project records onto a different header via a name mapping
//! - Feed a file's records through a consumer callback

pub mod config;
pub mod error;
pub mod feeder;
pub mod field;
pub mod mapper;
pub mod parser;
pub mod reader;
pub mod record;
pub mod writer;

pub use config::{key_of, Config};
pub use error::{Error, Result};
pub use feeder::{Feeder, FeederConfig, RecordConsumer};
pub use mapper::ColumnMapper;
pub use parser::{ParseState, Parser};
pub use reader::{CsvReader, FileSource, LineSource, Records};
pub use record::{FieldSource, Header, Record};
pub use writer::{CsvWriter, FileSink, LineSink};
