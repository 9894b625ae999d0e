//! Record output: line sinks and the CSV writer

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{Header, Record};

/// A sink for text lines; each line gets exactly one trailing newline
pub trait LineSink {
    /// Append one line to the sink
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush buffered output, if any
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> LineSink for W {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self, "{line}")
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

/// A buffered file line sink that counts the lines it writes.
///
/// Opened either truncating or appending; in append mode the sink records
/// whether the destination already held content, which decides whether a
/// header line is due.
pub struct FileSink {
    writer: BufWriter<std::fs::File>,
    path: PathBuf,
    appending: bool,
    count: usize,
}

impl FileSink {
    /// Create (or truncate) the destination file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, false)
    }

    /// Open the destination file for appending
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, true)
    }

    fn open<P: AsRef<Path>>(path: P, append: bool) -> Result<Self> {
        let path = path.as_ref();
        let appending = append
            && path
                .metadata()
                .map(|meta| meta.len() > 0)
                .unwrap_or(false);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(|e| Error::FileWrite {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            appending,
            count: 0,
        })
    }

    /// The path this sink writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the sink extends a pre-existing non-empty file
    pub fn is_appending(&self) -> bool {
        self.appending
    }

    /// The number of lines written so far
    pub fn line_count(&self) -> usize {
        self.count
    }
}

impl LineSink for FileSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.count += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.writer)
    }
}

/// A writer serializing [`Record`]s to a line sink.
///
/// The header line is written once, ahead of the first record, unless the
/// writer appends to a destination that already has content.
pub struct CsvWriter<K> {
    sink: Option<K>,
    header: Option<Arc<Header>>,
    append: bool,
    records: usize,
}

impl<K: LineSink> CsvWriter<K> {
    /// Create a writer that has not been opened yet
    pub fn new() -> Self {
        Self {
            sink: None,
            header: None,
            append: false,
            records: 0,
        }
    }

    /// Attach the line sink. `append` tells the writer the destination
    /// already holds records, so the header line is suppressed.
    pub fn open(&mut self, sink: K, append: bool) -> Result<()> {
        if self.sink.is_some() {
            return Err(Error::AlreadySet("sink"));
        }
        self.sink = Some(sink);
        self.append = append;
        self.records = 0;
        Ok(())
    }

    /// The header in effect, once known
    pub fn header(&self) -> Option<&Arc<Header>> {
        self.header.as_ref()
    }

    /// The number of records written so far
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Write the header line explicitly.
    ///
    /// Allowed at most once, and only before any record has been written.
    pub fn write_header<I, S>(&mut self, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.header.is_some() || self.records > 0 {
            return Err(Error::AlreadyWriting);
        }
        let header = Header::new(columns).shared();

        self.sink_mut()?.write_line(&header.serialize())?;
        self.header = Some(header);
        Ok(())
    }

    /// Serialize one record as a logical line.
    ///
    /// On the first call without an explicit header, the record's own
    /// header is adopted and written out, unless this writer appends to a
    /// pre-existing destination.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.header.is_none() {
            let header = Arc::clone(record.header());

            if !self.append {
                self.sink_mut()?.write_line(&header.serialize())?;
            }
            debug!(columns = header.column_count(), "csv header adopted");
            self.header = Some(header);
        }
        let line = record.serialize();

        self.sink_mut()?.write_line(&line)?;
        self.records += 1;
        Ok(())
    }

    /// Flush the underlying sink
    pub fn flush(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush()?;
        }
        Ok(())
    }

    /// Flush and release the sink. Safe to call at any point, idempotent.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            sink.flush()?;
        }
        Ok(())
    }

    /// Flush and hand back the sink, consuming the writer
    pub fn into_sink(mut self) -> Result<Option<K>> {
        self.flush()?;
        Ok(self.sink.take())
    }

    fn sink_mut(&mut self) -> Result<&mut K> {
        self.sink
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "writer is not open").into())
    }
}

impl<K: LineSink> Default for CsvWriter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvWriter<FileSink> {
    /// Open a writer that creates (or truncates) a file
    pub fn create_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut writer = Self::new();
        writer.open(FileSink::create(path)?, false)?;

        Ok(writer)
    }

    /// Open a writer that appends to a file; the header line is written
    /// only when the file is missing or empty
    pub fn append_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let sink = FileSink::append(path)?;
        let append = sink.is_appending();
        let mut writer = Self::new();
        writer.open(sink, append)?;

        Ok(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn sample_record(values: &[&str]) -> Record {
        let header = Header::new(["id", "note"]).shared();
        Record::from_values(
            &header,
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    fn written(writer: &mut CsvWriter<Vec<u8>>) -> String {
        writer.flush().unwrap();
        String::from_utf8(writer.sink.as_ref().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_header_written_before_first_record() {
        let mut writer = CsvWriter::new();
        writer.open(Vec::new(), false).unwrap();
        writer.write_record(&sample_record(&["1", "a"])).unwrap();

        assert_eq!(written(&mut writer), "id;note\n1;a\n");
    }

    #[test]
    fn test_header_suppressed_when_appending() {
        let mut writer = CsvWriter::new();
        writer.open(Vec::new(), true).unwrap();
        writer.write_record(&sample_record(&["1", "a"])).unwrap();

        assert_eq!(written(&mut writer), "1;a\n");
    }

    #[test]
    fn test_fields_are_encoded() {
        let mut writer = CsvWriter::new();
        writer.open(Vec::new(), false).unwrap();
        writer
            .write_record(&sample_record(&["1", "a;b\nc"]))
            .unwrap();

        assert_eq!(written(&mut writer), "id;note\n1;\"a;b\nc\"\n");
    }

    #[test]
    fn test_explicit_header() {
        let mut writer = CsvWriter::new();
        writer.open(Vec::new(), false).unwrap();
        writer.write_header(["id", "note"]).unwrap();
        writer.write_record(&sample_record(&["1", "a"])).unwrap();

        assert_eq!(written(&mut writer), "id;note\n1;a\n");
        assert_eq!(writer.record_count(), 1);
    }

    #[test]
    fn test_header_after_record_fails() {
        let mut writer: CsvWriter<Vec<u8>> = CsvWriter::new();
        writer.open(Vec::new(), false).unwrap();
        writer.write_record(&sample_record(&["1", "a"])).unwrap();

        assert!(matches!(
            writer.write_header(["id", "note"]),
            Err(Error::AlreadyWriting)
        ));
    }

    #[test]
    fn test_header_twice_fails() {
        let mut writer: CsvWriter<Vec<u8>> = CsvWriter::new();
        writer.open(Vec::new(), false).unwrap();
        writer.write_header(["id"]).unwrap();

        assert!(matches!(
            writer.write_header(["id"]),
            Err(Error::AlreadyWriting)
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut writer: CsvWriter<Vec<u8>> = CsvWriter::new();
        writer.open(Vec::new(), false).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
    }
}
