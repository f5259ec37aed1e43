//! MutableDataTable: parsing, mutations and save/parse round trips

use tabula_core::column::Column;
use tabula_core::config::CsvOptions;
use tabula_core::error::Error;
use tabula_core::row::Row;
use tabula_core::sparse::SparseGrid;
use tabula_table::adapters::{parse_str, save_to_string};
use tabula_table::{DataTable, MutableDataTable};

const PEOPLE: &str = "name, age,    favorite fruit\nBob, 20, apples\nEd, 65, prunes\nSarah, 40, cherries";

fn people() -> MutableDataTable {
    parse_str(PEOPLE).expect("people parses")
}

fn assert_rectangular(t: &MutableDataTable) {
    for col in t.columns() {
        assert_eq!(col.len(), t.num_rows(), "column '{}' length", col.name);
    }
}

#[test]
fn test_keep_rows_by_fruit() {
    let mut t = people();
    let kept = t.keep_rows(|row| row["favorite fruit"] == *"prunes").unwrap();
    assert_eq!(kept, 1);
    let eol = tabula_io::writers::LINE_ENDING;
    assert_eq!(
        save_to_string(&t).unwrap(),
        format!("name,age,favorite fruit{eol}Ed,65,prunes{eol}")
    );
    assert_rectangular(&t);
}

#[test]
fn test_header_is_trimmed_and_case_insensitive() {
    let t = people();
    assert_eq!(t.names(), vec!["name", "age", "favorite fruit"]);
    assert!(t.has_column("AGE"));
    assert!(t.has_column("Favorite Fruit"));
    assert!(!t.has_column("favoritefruit"));
    assert_eq!(t.get_cell(2, "NAME"), Some("Sarah"));
}

#[test]
fn test_keep_columns_is_idempotent() {
    let mut once = people();
    once.keep_columns(&["favorite fruit", "name"], true).unwrap();
    let mut twice = once.clone();
    twice.keep_columns(&["favorite fruit", "name"], true).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.names(), vec!["favorite fruit", "name"]);
    assert_eq!(once.num_rows(), 3);
}

#[test]
fn test_failed_mutation_leaves_table_unchanged() {
    let mut t = people();
    let before = t.clone();

    assert!(t.keep_columns(&["name", "nope"], true).is_err());
    assert!(t.delete_columns(&["age", "nope"]).is_err());
    assert!(t.rename_column("age", "NAME", true).is_err());
    assert!(t.reorder_column("age", 4).is_err());
    assert!(t.create_column("Age", None).is_err());
    assert_eq!(t, before);
}

#[test]
fn test_lenient_variants_ignore_missing_names() {
    let mut t = people();
    t.keep_columns(&["name", "nope"], false).unwrap();
    assert_eq!(t.names(), vec!["name"]);

    let mut t = people();
    assert_eq!(t.delete_columns_allow_missing(&["AGE", "nope"]), 1);
    t.rename_column("nope", "other", false).unwrap();
    assert_eq!(t.names(), vec!["name", "favorite fruit"]);
}

#[test]
fn test_reorder_column_positions() {
    let mut t = people();
    t.reorder_column("name", 3).unwrap();
    assert_eq!(t.names(), vec!["age", "favorite fruit", "name"]);
    t.reorder_column("name", 0).unwrap();
    assert_eq!(t.names(), vec!["name", "age", "favorite fruit"]);
    t.reorder_column("favorite fruit", 1).unwrap();
    assert_eq!(t.names(), vec!["name", "favorite fruit", "age"]);
    assert_eq!(t.row(1).unwrap().values(), vec!["Ed", "prunes", "65"]);
}

#[test]
fn test_rename_changes_case_only() {
    let mut t = people();
    t.rename_column("name", "Name", true).unwrap();
    assert_eq!(t.names()[0], "Name");
    assert!(matches!(
        t.rename_column("Name", "", true),
        Err(Error::Argument(_))
    ));
}

#[test]
fn test_create_column_from_rows() {
    let mut t = people();
    let mut compute = |row: tabula_core::row::RowRef<'_>| {
        let age: u32 = row["age"].parse().unwrap_or(0);
        let senior = if age >= 40 { "yes" } else { "no" };
        senior.to_string()
    };
    t.create_column("senior", Some(&mut compute)).unwrap();
    t.create_column("notes", None).unwrap();
    assert_eq!(t.column("senior").unwrap().values, vec!["no", "yes", "yes"]);
    assert_eq!(t.column("notes").unwrap().values, vec!["", "", ""]);
    assert_rectangular(&t);
}

#[test]
fn test_create_columns_from_shape() {
    let mut t = MutableDataTable::read_str("full\nAda Lovelace\n\nAlan Turing\n", &CsvOptions::default()).unwrap();
    let added = t
        .create_columns_from_shape(|row| {
            let (first, last) = row["full"].split_once(' ')?;
            Some(vec![
                ("first".to_string(), first.to_string()),
                ("last".to_string(), last.to_string()),
            ])
        })
        .unwrap();
    assert_eq!(added, 2);
    assert_eq!(t.names(), vec!["full", "first", "last"]);
    assert_eq!(t.get_cell(1, "last"), Some("Turing"));
    assert_rectangular(&t);
}

#[test]
fn test_shape_mismatch_fails_without_changes() {
    let mut t = people();
    let before = t.clone();
    let err = t
        .create_columns_from_shape(|row| {
            let mut fields = vec![("upper".to_string(), row["name"].to_uppercase())];
            if row["name"] == *"Ed" {
                fields.push(("extra".to_string(), String::new()));
            }
            Some(fields)
        })
        .unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
    assert_eq!(t, before);
}

#[test]
fn test_mutations_through_row_views() {
    let mut t = people();
    t.for_each_row_mut(|row| {
        let upper = row.get("name").unwrap_or_default().to_uppercase();
        row.set("NAME", upper).unwrap();
    });
    t.apply_to_column("age", |v| format!("{v}y")).unwrap();
    assert_eq!(t.row(0).unwrap().values(), vec!["BOB", "20y", "apples"]);
}

#[test]
fn test_detached_rows_are_read_only() {
    let t = people();
    let mut copy = t.row(0).unwrap().to_detached();
    assert!(matches!(
        copy.set("name", "x".into()),
        Err(Error::ReadOnly(_))
    ));
    assert_eq!(copy.get("NAME"), Some("Bob"));
}

#[test]
fn test_save_parse_round_trip_with_quotes() {
    let t = MutableDataTable::from_columns(vec![
        Column::new("id", vec!["1".into(), "2".into(), "3".into()]),
        Column::new("text", vec!["a,b".into(), "say \"hi\"".into(), "line1\nline2".into()]),
        Column::new("empty", vec![String::new(), "x".into(), String::new()]),
    ])
    .unwrap();
    let text = save_to_string(&t).unwrap();
    assert!(text.contains("\"a,b\""));
    assert!(text.contains("\"say \"\"hi\"\"\""));
    assert_eq!(parse_str(&text).unwrap(), t);
}

#[test]
fn test_round_trip_after_mutations() {
    let mut t = people();
    t.delete_columns(&["age"]).unwrap();
    t.keep_rows(|row| row["name"] != *"Bob").unwrap();
    t.reorder_column("favorite fruit", 0).unwrap();
    let reparsed = parse_str(&save_to_string(&t).unwrap()).unwrap();
    assert_eq!(reparsed, t);
}

#[test]
fn test_strict_and_lenient_wide_rows() {
    let text = "a,b\n1,2\n1,2,3\n4\n";
    let err = MutableDataTable::read_str(text, &CsvOptions::default()).unwrap_err();
    assert!(matches!(err.as_core(), Some(Error::Schema(_))));
    assert!(err.to_string().contains("line 3"));

    let (t, report) = MutableDataTable::read_with_report(text.as_bytes(), &CsvOptions::lenient()).unwrap();
    assert_eq!(t.num_rows(), 2);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.dropped_lines, vec![3]);
    assert_eq!(t.row(1).unwrap().values(), vec!["4", ""]);
}

#[test]
fn test_unterminated_quote_is_fatal() {
    for opts in [CsvOptions::default(), CsvOptions::lenient()] {
        let err = MutableDataTable::read_str("a,b\n1,\"open\n", &opts).unwrap_err();
        assert!(err.is_parse());
    }
}

#[test]
fn test_tab_delimiter_is_detected() {
    let t = MutableDataTable::read_str("a\tb\n1, x\t2\n", &CsvOptions::default()).unwrap();
    assert_eq!(t.row(0).unwrap().values(), vec!["1, x", "2"]);
}

#[test]
fn test_duplicate_header_is_rejected() {
    let err = parse_str("id,ID\n1,2\n").unwrap_err();
    assert!(err.to_string().contains("duplicate column"));
}

#[test]
fn test_grid_round_trip() {
    let mut grid = SparseGrid::new();
    grid.set(0, 0, "sku");
    grid.set(0, 2, "qty");
    grid.set(1, 0, "A-1");
    grid.set(2, 2, "7");
    let t = MutableDataTable::from_grid(&grid).unwrap();
    assert_eq!(t.names(), vec!["sku", "column2", "qty"]);
    assert_eq!(t.num_rows(), 2);
    assert_eq!(t.get_cell(1, "sku"), Some(""));

    let back = t.to_grid();
    assert_eq!(back.get(2, 2), Some("7"));
    assert_eq!(back.get(0, 1), Some("column2"));
    assert_eq!(back.get(2, 0), None);
}

#[test]
fn test_grid_blank_header_avoids_taken_names() {
    let mut grid = SparseGrid::new();
    grid.set(0, 0, "id");
    grid.set(0, 2, "Column2");
    grid.set(0, 3, "column3");
    grid.set(1, 1, "x");
    let t = MutableDataTable::from_grid(&grid).unwrap();
    assert_eq!(t.names(), vec!["id", "column4", "Column2", "column3"]);
    assert_eq!(t.get_cell(0, "column4"), Some("x"));
}

#[test]
fn test_tab_in_header_name_round_trips() {
    let t = MutableDataTable::from_columns(vec![
        Column::new("a\tb", vec!["1".into()]),
        Column::new("c", vec!["x\ty".into()]),
    ])
    .unwrap();
    let text = save_to_string(&t).unwrap();
    assert!(text.starts_with("\"a\tb\",c"));
    let reparsed = parse_str(&text).unwrap();
    assert_eq!(reparsed.names(), vec!["a\tb", "c"]);
    assert_eq!(reparsed, t);
}
