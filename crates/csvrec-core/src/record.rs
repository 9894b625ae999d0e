//! Header and record model for delimited files

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::field;

/// The ordered column schema shared by a family of records.
///
/// Columns are fixed at construction. The delimiter and the quote symbol
/// may each be assigned once afterwards; a header is configured while
/// uniquely owned and then frozen behind an [`Arc`] via [`Header::shared`].
#[derive(Debug, Clone)]
pub struct Header {
    columns: Vec<String>,
    delimiter: Option<char>,
    quote: Option<char>,
}

impl Header {
    /// Create a header from an ordered list of column names
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            delimiter: None,
            quote: None,
        }
    }

    /// Freeze this header for sharing between records
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The ordered column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The field delimiter in effect for this header
    pub fn delimiter(&self) -> char {
        self.delimiter.unwrap_or(field::DELIMITER)
    }

    /// The quote character in effect for this header
    pub fn quote(&self) -> char {
        self.quote.unwrap_or(field::QUOTE)
    }

    /// Assign the field delimiter. Fails if a delimiter was already assigned.
    pub fn set_delimiter(&mut self, delimiter: char) -> Result<()> {
        if self.delimiter.is_some() {
            return Err(Error::AlreadySet("delimiter"));
        }
        self.delimiter = Some(delimiter);
        Ok(())
    }

    /// Assign the quote symbol. Fails if a quote symbol was already assigned.
    pub fn set_quote(&mut self, quote: char) -> Result<()> {
        if self.quote.is_some() {
            return Err(Error::AlreadySet("quote"));
        }
        self.quote = Some(quote);
        Ok(())
    }

    /// Resolve a column name to its position
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The header line in wire format
    pub fn serialize(&self) -> String {
        join_encoded(&self.columns, self.delimiter(), self.quote())
    }
}

/// One row of field values bound to a [`Header`].
///
/// The field vector always has exactly as many entries as the header has
/// columns; fields are addressed by column name.
#[derive(Debug, Clone)]
pub struct Record {
    header: Arc<Header>,
    fields: Vec<String>,
}

impl Record {
    /// Create a record with one empty field per column
    pub fn empty(header: &Arc<Header>) -> Self {
        let fields = vec![String::new(); header.column_count()];

        Self {
            header: Arc::clone(header),
            fields,
        }
    }

    /// Create a record from an ordered list of values.
    ///
    /// A list shorter than the header is right-padded with empty fields; a
    /// longer list is truncated.
    pub fn from_values(header: &Arc<Header>, values: Vec<String>) -> Self {
        let mut fields = values;
        fields.resize(header.column_count(), String::new());

        Self {
            header: Arc::clone(header),
            fields,
        }
    }

    /// Create a record from a name-to-value map.
    ///
    /// Columns absent from the map get an empty field.
    pub fn from_map(header: &Arc<Header>, values: &HashMap<String, String>) -> Self {
        let fields = header
            .columns()
            .iter()
            .map(|name| values.get(name).cloned().unwrap_or_default())
            .collect();

        Self {
            header: Arc::clone(header),
            fields,
        }
    }

    /// The header this record is bound to
    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    /// Look up a field value by column name
    pub fn get(&self, name: &str) -> Result<&str> {
        self.find(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// Look up a field value by column name, or None for an unknown name
    pub fn find(&self, name: &str) -> Option<&str> {
        self.header
            .index_of(name)
            .map(|index| self.fields[index].as_str())
    }

    /// Check whether this record has a field with the given name
    pub fn has(&self, name: &str) -> bool {
        self.header.index_of(name).is_some()
    }

    /// Set a field value by column name
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<&mut Self> {
        let index = self
            .header
            .index_of(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        self.fields[index] = value.into();

        Ok(self)
    }

    /// A copy of the field values in column order
    pub fn values(&self) -> Vec<String> {
        self.fields.clone()
    }

    /// Replace every field with the value the source holds under the same
    /// name, defaulting to an empty field where the source has none
    pub fn load_from(&mut self, source: &dyn FieldSource) {
        for index in 0..self.fields.len() {
            let name = &self.header.columns()[index];
            self.fields[index] = source.value(name).unwrap_or_default().to_string();
        }
    }

    /// The record line in wire format, one field at a time through the codec
    pub fn serialize(&self) -> String {
        join_encoded(&self.fields, self.header.delimiter(), self.header.quote())
    }
}

/// A named-field lookup used to copy values across record shapes
pub trait FieldSource {
    /// The value stored under the given field name, if any
    fn value(&self, name: &str) -> Option<&str>;
}

impl FieldSource for Record {
    fn value(&self, name: &str) -> Option<&str> {
        self.find(name)
    }
}

impl FieldSource for HashMap<String, String> {
    fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

fn join_encoded(values: &[String], delimiter: char, quote: char) -> String {
    let encoded: Vec<String> = values
        .iter()
        .map(|value| field::encode(value, delimiter, quote))
        .collect();

    encoded.join(&delimiter.to_string())
}
