//! Property-based tests for the CSV engine

use std::io::Cursor;

use proptest::prelude::*;

use csvrec_core::{field, CsvReader, CsvWriter, Header, ParseState, Parser, Record};

/// Values with no special handling on the wire
fn plain_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.-]{0,24}".prop_map(|s| s)
}

/// Values exercising the quoting rules: delimiters, quotes, newlines
fn special_value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        plain_value_strategy(),
        "[a-z0-9]{0,8};[a-z0-9]{0,8}".prop_map(|s| s),
        "[a-z0-9]{0,8}\"[a-z0-9]{0,8}".prop_map(|s| s),
        "[a-z0-9]{0,8}\n[a-z0-9]{0,8}".prop_map(|s| s),
        Just("\"".to_string()),
        Just("\"\"".to_string()),
        Just(";\n\"".to_string()),
        Just(String::new()),
    ]
}

proptest! {
    // decode(encode(v)) == v for every value, with no character class
    // excluded from the codec itself
    #[test]
    fn prop_codec_round_trip(value in any::<String>()) {
        let wire = field::encode(&value, field::DELIMITER, field::QUOTE);
        let back = field::decode(&wire, field::QUOTE);

        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_codec_round_trip_special(value in special_value_strategy()) {
        let wire = field::encode(&value, field::DELIMITER, field::QUOTE);
        let back = field::decode(&wire, field::QUOTE);

        prop_assert_eq!(back, value);
    }

    // every record has exactly one field per column, whatever the length
    // of the constructing value list
    #[test]
    fn prop_record_arity(values in prop::collection::vec(plain_value_strategy(), 0..8)) {
        let header = Header::new(["a", "b", "c"]).shared();
        let record = Record::from_values(&header, values);

        prop_assert_eq!(record.values().len(), header.column_count());
    }

    // splitting a line of plain fields reproduces the fields
    #[test]
    fn prop_parser_splits_plain_fields(
        values in prop::collection::vec("[a-z0-9]{0,12}", 1..6)
    ) {
        let line = values.join(";");
        let mut parser = Parser::new(';');

        prop_assert_eq!(parser.parse(&line), ParseState::Complete);
        prop_assert_eq!(parser.take_fields().unwrap(), values);
    }

    // a record serialized by the writer is read back field for field,
    // through the full in-memory write/read stack
    #[test]
    fn prop_stream_round_trip(
        rows in prop::collection::vec(
            prop::collection::vec(special_value_strategy(), 2),
            1..5
        )
    ) {
        let header = Header::new(["left", "right"]).shared();

        let mut writer: CsvWriter<Vec<u8>> = CsvWriter::new();
        writer.open(Vec::new(), false).unwrap();
        let originals: Vec<Record> = rows
            .into_iter()
            .map(|values| Record::from_values(&header, values))
            .collect();
        for record in &originals {
            writer.write_record(record).unwrap();
        }
        let bytes = writer.into_sink().unwrap().unwrap();

        let mut reader = CsvReader::new();
        reader.open(Cursor::new(bytes)).unwrap();

        for original in &originals {
            let got = reader.read_record().unwrap().unwrap();
            prop_assert_eq!(got.values(), original.values());
        }
        prop_assert!(reader.read_record().unwrap().is_none());
    }

    // the serialized wire line decodes back through the parser alone
    #[test]
    fn prop_serialize_parse_round_trip(
        values in prop::collection::vec(special_value_strategy(), 1..5)
    ) {
        let columns: Vec<String> = (0..values.len()).map(|i| format!("c{i}")).collect();
        let header = Header::new(columns).shared();
        let record = Record::from_values(&header, values.clone());

        let mut parser = Parser::new(';');
        let mut state = ParseState::Pending;
        for line in record.serialize().split('\n') {
            state = parser.parse(line);
        }
        prop_assert_eq!(state, ParseState::Complete);

        let decoded: Vec<String> = parser
            .take_fields()
            .unwrap()
            .iter()
            .map(|token| field::decode(token, field::QUOTE))
            .collect();
        prop_assert_eq!(decoded, values);
    }
}
