//! Line tokenizer turning physical input lines into record field lists

use crate::field;

/// Completion state of the record currently being assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// No quoted continuation is pending; the field list is a full record
    Complete,
    /// Inside an unterminated quoted field; another line must be supplied
    Pending,
}

/// A state machine that splits CSV text lines into fields.
///
/// The parser survives across lines so that a quoted field spanning several
/// physical lines is reassembled into one field value. Fields keep their
/// wire quoting; decoding is the caller's concern.
#[derive(Debug)]
pub struct Parser {
    delimiter: char,
    quote: char,
    state: ParseState,
    fields: Vec<String>,
}

impl Parser {
    /// Create a parser for the given field delimiter
    pub fn new(delimiter: char) -> Self {
        Self::with_quote(delimiter, field::QUOTE)
    }

    /// Create a parser with an explicit quote character
    pub fn with_quote(delimiter: char, quote: char) -> Self {
        Self {
            delimiter,
            quote,
            state: ParseState::Complete,
            fields: Vec::new(),
        }
    }

    /// The completion state after the last `parse` call
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Consume one physical line.
    ///
    /// Returns `Complete` when the accumulated fields form a full record,
    /// `Pending` when a quoted field is still open and the next physical
    /// line belongs to the same record.
    pub fn parse(&mut self, line: &str) -> ParseState {
        for (index, token) in line.split(self.delimiter).enumerate() {
            self.state = match self.state {
                ParseState::Complete => self.push(token),
                ParseState::Pending => {
                    // The first token of a new physical line continues the
                    // open field across a line break; later tokens were
                    // split off a delimiter inside the quoted value.
                    let joiner = if index == 0 {
                        field::NEWLINE
                    } else {
                        self.delimiter
                    };
                    self.append(token, joiner)
                }
            };
        }
        self.state
    }

    /// Return the accumulated fields and clear the buffer.
    ///
    /// Returns `None` when no fields have been accumulated.
    pub fn take_fields(&mut self) -> Option<Vec<String>> {
        if self.fields.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.fields))
        }
    }

    fn push(&mut self, token: &str) -> ParseState {
        self.fields.push(token.to_string());
        self.opens(token)
    }

    fn append(&mut self, token: &str, joiner: char) -> ParseState {
        let last = self
            .fields
            .last_mut()
            .expect("pending state implies an open field");
        last.push(joiner);
        last.push_str(token);

        self.closes(token)
    }

    /// Next state for a token that starts a new field
    fn opens(&self, token: &str) -> ParseState {
        match token.strip_prefix(self.quote) {
            Some("") => ParseState::Pending,
            Some(rest) => self.closes(rest),
            None => ParseState::Complete,
        }
    }

    /// Next state for a token inside an open quoted field: the field closes
    /// exactly when the token ends in an odd run of quote characters
    fn closes(&self, token: &str) -> ParseState {
        let trailing = token
            .chars()
            .rev()
            .take_while(|&ch| ch == self.quote)
            .count();

        if trailing % 2 == 1 {
            ParseState::Complete
        } else {
            ParseState::Pending
        }
    }
}
