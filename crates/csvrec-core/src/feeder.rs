//! Batch processing of CSV input through a record consumer

use std::path::PathBuf;

use tracing::warn;

use crate::config::{key_of, Config};
use crate::error::{Error, Result};
use crate::reader::{CsvReader, FileSource};
use crate::record::Record;

/// Receiver of the records pulled by a [`Feeder`].
///
/// For one run the calls arrive as `on_init`, then `handle` once per
/// record, then exactly one of `on_exit` (success) or `on_error`
/// (I/O or parse failure) — never both.
pub trait RecordConsumer {
    /// Called once before the first record
    fn on_init(&mut self) {}

    /// Process one record
    fn handle(&mut self, record: Record);

    /// Called once after the last record
    fn on_exit(&mut self) {}

    /// Called when reading fails; terminates the run
    fn on_error(&mut self, error: Error) {
        warn!(%error, "csv feed aborted");
    }
}

/// Settings for a feeder run, bound from configuration by explicit key
/// lookup
#[derive(Debug, Clone)]
pub struct FeederConfig {
    /// The input CSV file
    pub path: PathBuf,
    /// Optional field delimiter override
    pub delimiter: Option<char>,
}

impl FeederConfig {
    /// Bind the feeder settings from a configuration tree
    pub fn parse(config: &Config) -> Result<Self> {
        let path = PathBuf::from(config.get_str(&key_of("path"))?);
        let delimiter = config
            .str_or(&key_of("delimiter"), "")
            .chars()
            .next();

        Ok(Self { path, delimiter })
    }
}

/// Loops over the records of a CSV file and delegates each one to a
/// [`RecordConsumer`]
pub struct Feeder<C> {
    config: FeederConfig,
    consumer: C,
}

impl<C: RecordConsumer> Feeder<C> {
    /// Create a feeder for the given input file
    pub fn new<P: Into<PathBuf>>(path: P, consumer: C) -> Self {
        Self {
            config: FeederConfig {
                path: path.into(),
                delimiter: None,
            },
            consumer,
        }
    }

    /// Create a feeder from configuration
    pub fn from_config(config: &Config, consumer: C) -> Result<Self> {
        Ok(Self {
            config: FeederConfig::parse(config)?,
            consumer,
        })
    }

    /// Pull every record from the input and feed it to the consumer.
    ///
    /// Returns the consumer so callers can collect whatever it gathered.
    pub fn run(mut self) -> C {
        self.consumer.on_init();

        match self.feed() {
            Ok(()) => self.consumer.on_exit(),
            Err(error) => self.consumer.on_error(error),
        }
        self.consumer
    }

    fn feed(&mut self) -> Result<()> {
        let mut reader = CsvReader::new();

        if let Some(delimiter) = self.config.delimiter {
            reader.set_delimiter(delimiter)?;
        }
        reader.open(FileSource::open(&self.config.path)?)?;

        while let Some(record) = reader.read_record()? {
            self.consumer.handle(record);
        }
        reader.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Default)]
    struct Probe {
        calls: Vec<String>,
    }

    impl RecordConsumer for Probe {
        fn on_init(&mut self) {
            self.calls.push("init".to_string());
        }

        fn handle(&mut self, record: Record) {
            self.calls
                .push(format!("handle:{}", record.get("id").unwrap()));
        }

        fn on_exit(&mut self) {
            self.calls.push("exit".to_string());
        }

        fn on_error(&mut self, _error: Error) {
            self.calls.push("error".to_string());
        }
    }

    fn temp_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_callback_order() {
        let file = temp_csv("id;name\n1;Ann\n2;Bob\n");
        let probe = Feeder::new(file.path(), Probe::default()).run();

        assert_eq!(probe.calls, ["init", "handle:1", "handle:2", "exit"]);
    }

    #[test]
    fn test_error_is_terminal() {
        let file = temp_csv("id;name\n1;Ann\n2;\"open quote\n");
        let probe = Feeder::new(file.path(), Probe::default()).run();

        assert_eq!(probe.calls, ["init", "handle:1", "error"]);
    }

    #[test]
    fn test_missing_file_reports_error_after_init() {
        let probe = Feeder::new("/definitely/not/here.csv", Probe::default()).run();

        assert_eq!(probe.calls, ["init", "error"]);
    }

    #[test]
    fn test_from_config() {
        let file = temp_csv("id,name\n7,Ann\n");
        let json = format!(
            r#"{{"path": "{}", "delimiter": ","}}"#,
            file.path().display()
        );
        let config = Config::from_str(&json).unwrap();
        let probe = Feeder::from_config(&config, Probe::default())
            .unwrap()
            .run();

        assert_eq!(probe.calls, ["init", "handle:7", "exit"]);
    }

    #[test]
    fn test_feeder_config_parse() {
        let config = Config::from_str(r#"{"path": "in.csv"}"#).unwrap();
        let parsed = FeederConfig::parse(&config).unwrap();

        assert_eq!(parsed.path, PathBuf::from("in.csv"));
        assert_eq!(parsed.delimiter, None);
    }

    #[test]
    fn test_feeder_config_requires_path() {
        let config = Config::from_str("{}").unwrap();

        assert!(matches!(
            FeederConfig::parse(&config),
            Err(Error::MissingKey(key)) if key == "path"
        ));
    }
}
