//! OffsetIndex: build, lookup and staleness

use std::fs;
use std::io::Cursor;

use tabula_core::config::CsvOptions;
use tabula_core::row::Row;
use tabula_table::OffsetIndex;

fn write_temp(text: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    fs::write(file.path(), text).expect("write temp file");
    file
}

#[test]
fn test_lookup_with_mixed_line_endings() {
    let file = write_temp("h1,h2\na1,a2\r\nb1,b2");
    let index = OffsetIndex::build(file.path(), "h1", &CsvOptions::default()).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.offset_of("a1"), Some(6));
    assert_eq!(index.offset_of("b1"), Some(13));

    let row = index.lookup("a1").unwrap().expect("a1 is indexed");
    assert_eq!(row.get("h1"), Some("a1"));
    assert_eq!(row.get("h2"), Some("a2"));

    let row = index.lookup("b1").unwrap().expect("b1 is indexed");
    assert_eq!(row.values(), vec!["b1", "b2"]);
}

#[test]
fn test_missing_key_is_not_an_error() {
    let file = write_temp("h1,h2\na1,a2\r\nb1,b2");
    let index = OffsetIndex::build(file.path(), "h1", &CsvOptions::default()).unwrap();
    assert!(index.lookup("missing").unwrap().is_none());
    assert!(!index.contains_key("missing"));
}

#[test]
fn test_unknown_key_column_fails() {
    let file = write_temp("h1,h2\na1,a2\n");
    let err = OffsetIndex::build(file.path(), "nope", &CsvOptions::default()).unwrap_err();
    assert!(err.to_string().contains("unknown column"));
}

#[test]
fn test_key_column_is_case_insensitive() {
    let file = write_temp("ID,Name\n7,Ada\n");
    let index = OffsetIndex::build(file.path(), "id", &CsvOptions::default()).unwrap();
    assert_eq!(index.key_column(), "ID");
    assert_eq!(index.lookup("7").unwrap().unwrap().get("name"), Some("Ada"));
}

#[test]
fn test_quoted_line_breaks_keep_offsets_right() {
    let text = "id,note\n1,\"first\nsecond\"\n2,\"a, b\"\n3,plain\n";
    let file = write_temp(text);
    let index = OffsetIndex::build(file.path(), "id", &CsvOptions::default()).unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!(index.lookup("1").unwrap().unwrap().get("note"), Some("first\nsecond"));
    assert_eq!(index.lookup("2").unwrap().unwrap().get("note"), Some("a, b"));
    assert_eq!(index.lookup("3").unwrap().unwrap().get("note"), Some("plain"));
    let third = text.find("3,plain").unwrap() as u64;
    assert_eq!(index.offset_of("3"), Some(third));
}

#[test]
fn test_first_occurrence_wins() {
    let file = write_temp("k,v\nx,1\nx,2\n");
    let index = OffsetIndex::build(file.path(), "k", &CsvOptions::default()).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.lookup("x").unwrap().unwrap().get("v"), Some("1"));
}

#[test]
fn test_short_rows_are_skipped_or_padded() {
    let file = write_temp("a,b,key\n1,2,k1\n3\n4,5,k2\n");
    let index = OffsetIndex::build(file.path(), "key", &CsvOptions::default()).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.skipped(), 1);

    let file = write_temp("key,a,b\nk1\n");
    let index = OffsetIndex::build(file.path(), "key", &CsvOptions::default()).unwrap();
    assert_eq!(index.lookup("k1").unwrap().unwrap().values(), vec!["k1", "", ""]);
}

#[test]
fn test_changed_file_is_stale() {
    let file = write_temp("id,v\n1,a\n2,b\n");
    let index = OffsetIndex::build(file.path(), "id", &CsvOptions::default()).unwrap();
    assert!(!index.is_stale().unwrap());

    fs::write(file.path(), "id,v\n1,a\n9,b\n").unwrap();
    assert!(index.is_stale().unwrap());
    assert!(index.lookup("2").is_err());
}

#[test]
fn test_reader_built_index_uses_lookup_in() {
    let bytes = b"name;qty\nbolt;4\nnut;9\n".to_vec();
    let opts = CsvOptions::default().with_delimiter(';');
    let index = OffsetIndex::build_from(&bytes[..], "name", &opts).unwrap();
    assert!(index.lookup("nut").is_err());
    assert!(!index.is_stale().unwrap());

    let mut source = Cursor::new(bytes);
    let row = index.lookup_in(&mut source, "nut").unwrap().unwrap();
    assert_eq!(row.get("QTY"), Some("9"));
    assert!(index.lookup_in(&mut source, "washer").unwrap().is_none());
}

#[test]
fn test_rows_wider_than_header_are_skipped() {
    let file = write_temp("k,v\nx,1,extra\ny,2\n");
    let index = OffsetIndex::build(file.path(), "k", &CsvOptions::default()).unwrap();
    assert!(!index.contains_key("x"));
    assert_eq!(index.skipped(), 1);
    assert!(index.lookup("x").unwrap().is_none());
    assert_eq!(index.lookup("y").unwrap().unwrap().get("v"), Some("2"));
    assert!(!index.is_stale().unwrap());
}
