//! Per-field quoting and escaping for the CSV wire format

/// Default field delimiter.
pub const DELIMITER: char = ';';

/// Default quote character.
pub const QUOTE: char = '"';

/// Line separator embedded in multi-line field values.
pub const NEWLINE: char = '\n';

/// Convert a field value into its wire representation.
///
/// A value containing the delimiter, the quote character or a newline is
/// wrapped in quotes, with every interior quote character doubled. Any
/// other value passes through unchanged.
pub fn encode(value: &str, delimiter: char, quote: char) -> String {
    if !value.contains(delimiter) && !value.contains(quote) && !value.contains(NEWLINE) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
    out
}

/// Convert a wire field back into its value.
///
/// A field starting with the quote character loses one enclosing quote on
/// each side, and doubled quote characters collapse back to one. Any other
/// field passes through unchanged.
pub fn decode(wire: &str, quote: char) -> String {
    let Some(rest) = wire.strip_prefix(quote) else {
        return wire.to_string();
    };
    let inner = rest.strip_suffix(quote).unwrap_or(rest);
    let doubled: String = [quote, quote].iter().collect();

    inner.replace(&doubled, &quote.to_string())
}
