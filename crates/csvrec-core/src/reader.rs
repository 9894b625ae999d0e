//! Record input: line sources and the CSV reader

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::field;
use crate::parser::{ParseState, Parser};
use crate::record::{Header, Record};

/// A source of decoded text lines without their trailing newline
pub trait LineSource {
    /// The next line, or `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

impl<R: BufRead> LineSource for R {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();

        if BufRead::read_line(self, &mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// A buffered file line source that counts the lines it hands out
pub struct FileSource {
    reader: BufReader<File>,
    path: PathBuf,
    count: usize,
}

impl FileSource {
    /// Open a file for line input
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            count: 0,
        })
    }

    /// The path this source reads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The number of physical lines read so far
    pub fn line_count(&self) -> usize {
        self.count
    }
}

impl LineSource for FileSource {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let line = LineSource::read_line(&mut self.reader)?;

        if line.is_some() {
            self.count += 1;
        }
        Ok(line)
    }
}

/// A reader producing [`Record`]s from a line source.
///
/// The header is built from the first logical line on `open`; every record
/// read afterwards is bound to it. The delimiter may be overridden before
/// opening, never after.
pub struct CsvReader<S> {
    source: Option<S>,
    delimiter: Option<char>,
    header: Option<Arc<Header>>,
    parser: Option<Parser>,
    records: usize,
}

impl<S: LineSource> CsvReader<S> {
    /// Create a reader that has not been opened yet
    pub fn new() -> Self {
        Self {
            source: None,
            delimiter: None,
            header: None,
            parser: None,
            records: 0,
        }
    }

    /// Override the field delimiter. Fails once the reader has been opened.
    pub fn set_delimiter(&mut self, delimiter: char) -> Result<()> {
        if self.parser.is_some() {
            return Err(Error::AlreadySet("delimiter"));
        }
        self.delimiter = Some(delimiter);
        Ok(())
    }

    /// Attach the line source and build the header from the first logical
    /// line. An empty input leaves the reader without a header; it then
    /// yields no records.
    pub fn open(&mut self, source: S) -> Result<()> {
        if self.source.is_some() {
            return Err(Error::AlreadySet("source"));
        }
        let delimiter = self.delimiter.unwrap_or(field::DELIMITER);

        self.source = Some(source);
        self.parser = Some(Parser::new(delimiter));
        self.records = 0;

        if let Some(tokens) = self.read_fields()? {
            let mut header = Header::new(
                tokens
                    .iter()
                    .map(|token| field::decode(token, field::QUOTE)),
            );
            if let Some(delimiter) = self.delimiter {
                header.set_delimiter(delimiter)?;
            }
            debug!(columns = header.column_count(), "csv header read");
            self.header = Some(header.shared());
        }
        Ok(())
    }

    /// The header built on open, if the input was not empty
    pub fn header(&self) -> Option<&Arc<Header>> {
        self.header.as_ref()
    }

    /// The number of records produced so far
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Read the next record, or `None` once the input is exhausted.
    ///
    /// Fails with [`Error::MalformedInput`] if the input ends inside an
    /// unterminated quoted field.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let Some(header) = self.header.clone() else {
            return Ok(None);
        };
        let Some(tokens) = self.read_fields()? else {
            return Ok(None);
        };
        let quote = header.quote();
        let values = tokens
            .iter()
            .map(|token| field::decode(token, quote))
            .collect();

        self.records += 1;
        Ok(Some(Record::from_values(&header, values)))
    }

    /// Iterate over the remaining records
    pub fn records(&mut self) -> Records<'_, S> {
        Records { reader: self }
    }

    /// Release the line source. Safe to call at any point, idempotent.
    pub fn close(&mut self) {
        self.source = None;
    }

    /// Assemble one logical line worth of raw field tokens
    fn read_fields(&mut self) -> Result<Option<Vec<String>>> {
        let parser = self.parser.as_mut().expect("reader is open");

        loop {
            let line = match self.source.as_mut() {
                Some(source) => source.read_line()?,
                None => None,
            };
            match line {
                Some(line) => {
                    if parser.parse(&line) == ParseState::Complete {
                        break;
                    }
                }
                None => {
                    if parser.state() == ParseState::Pending {
                        return Err(Error::MalformedInput);
                    }
                    break;
                }
            }
        }
        Ok(parser.take_fields())
    }
}

impl<S: LineSource> Default for CsvReader<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReader<FileSource> {
    /// Open a reader over a file on the file system
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = Self::new();
        reader.open(FileSource::open(path)?)?;

        Ok(reader)
    }
}

/// Iterator over the records of an open reader
pub struct Records<'r, S> {
    reader: &'r mut CsvReader<S>,
}

impl<S: LineSource> Iterator for Records<'_, S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}
