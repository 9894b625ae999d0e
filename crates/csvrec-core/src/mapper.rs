//! Column projection between record shapes

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{Header, Record};

/// Rewrites records captured under one header into records under another.
///
/// The projection is loaded from a specification with one `target[=source]`
/// pair per line; a pair without an explicit source maps a column to the
/// same name. Blank lines and `#` comments are ignored.
#[derive(Debug)]
pub struct ColumnMapper {
    header: Arc<Header>,
    mapping: Vec<(String, String)>,
}

impl ColumnMapper {
    /// Parse a projection specification from text
    pub fn parse(spec: &str) -> Result<Self> {
        let mut mapping: Vec<(String, String)> = Vec::new();

        for line in spec.lines() {
            let line = match line.find('#') {
                Some(0) => continue,
                Some(index) => &line[..index],
                None => line,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (target, source) = match line.split_once('=') {
                Some((target, source)) => (target.trim(), source.trim()),
                None => (line, line),
            };
            if mapping.iter().any(|(known, _)| known == target) {
                return Err(Error::Mapping(format!(
                    "duplicate target column '{target}'"
                )));
            }
            mapping.push((target.to_string(), source.to_string()));
        }
        if mapping.is_empty() {
            return Err(Error::Mapping("no column pairs defined".to_string()));
        }
        debug!(columns = mapping.len(), "column mapping loaded");

        let header = Header::new(mapping.iter().map(|(target, _)| target.clone())).shared();
        Ok(Self { header, mapping })
    }

    /// Load a projection specification from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let spec = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&spec)
    }

    /// The target header records are projected onto
    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    /// Project a source record onto the target header.
    ///
    /// Target columns whose source column is absent from the record get an
    /// empty field. The source record is left untouched.
    pub fn apply(&self, record: &Record) -> Record {
        let values = self
            .mapping
            .iter()
            .map(|(_, source)| record.find(source).unwrap_or_default().to_string())
            .collect();

        Record::from_values(&self.header, values)
    }
}
