//! Typed binding over whole tables

use std::io::Cursor;

use tabula_bind::{bindable, Binder, ConverterRegistry, ParseStrategy};
use tabula_core::config::CsvOptions;
use tabula_core::row::Row;
use tabula_table::adapters::parse_str;
use tabula_table::{MutableDataTable, StreamingTable};

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    name: String,
    age: u32,
    favorite_fruit: String,
}

bindable!(Person { name: String, age: u32, favorite_fruit: String });

const PEOPLE: &str = "name, age,    favorite fruit\nBob, 20, apples\nEd, 65, prunes\nSarah, 40, cherries";

#[test]
fn test_bind_rows_of_mutable_table() {
    let table = parse_str(PEOPLE).unwrap();
    let binder = Binder::<Person>::for_table(&table).unwrap();
    let people: Vec<Person> = binder
        .bind_rows(&table)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(people.len(), 3);
    assert_eq!(
        people[1],
        Person {
            name: "Ed".into(),
            age: 65,
            favorite_fruit: "prunes".into(),
        }
    );
}

#[test]
fn test_bind_rows_of_streaming_table() {
    let table = StreamingTable::from_reader(Cursor::new(PEOPLE), &CsvOptions::default()).unwrap();
    let binder = Binder::<Person>::for_table(&table).unwrap();
    let ages: Vec<u32> = binder
        .bind_rows(&table)
        .unwrap()
        .map(|p| p.unwrap().age)
        .collect();
    assert_eq!(ages, vec![20, 65, 40]);
}

#[test]
fn test_bare_value_targets() {
    let ints = MutableDataTable::read_str("N\n12\nx\n", &CsvOptions::default()).unwrap();
    let binder = Binder::<i32>::for_table(&ints).unwrap();
    let values: Vec<i32> = binder.bind_rows(&ints).unwrap().map(Result::unwrap).collect();
    assert_eq!(values, vec![12, 0]);

    let pct = MutableDataTable::read_str("N\n32%\n32%%\n", &CsvOptions::default()).unwrap();
    let binder = Binder::<f64>::for_table(&pct).unwrap();
    let values: Vec<f64> = binder.bind_rows(&pct).unwrap().map(Result::unwrap).collect();
    assert_eq!(values[0], 0.32);
    assert!(values[1].is_nan());
}

#[test]
fn test_bare_value_needs_single_column() {
    let table = parse_str("a,b\n1,2\n").unwrap();
    let err = Binder::<i64>::for_table(&table).unwrap_err();
    assert!(err.to_string().contains("exactly one"));
}

#[test]
fn test_binder_rejects_other_layouts() {
    let table = parse_str(PEOPLE).unwrap();
    let binder = Binder::<Person>::for_table(&table).unwrap();
    let other = parse_str("age,name\n1,x\n").unwrap();
    assert!(binder.bind_rows(&other).is_err());
}

#[test]
fn test_bindings_report_strategies() {
    let binder = Binder::<Person>::build(&["NAME", "Favorite-Fruit", "shoe size"]).unwrap();
    assert_eq!(
        binder.bindings(),
        vec![
            ("name", "NAME", ParseStrategy::Text),
            ("favorite_fruit", "Favorite-Fruit", ParseStrategy::Text),
        ]
    );
    assert_eq!(binder.unmatched_fields(), &["age"]);
}

#[derive(Debug, Default)]
struct Host {
    addr: Option<std::net::Ipv4Addr>,
    port: u16,
}

impl tabula_bind::Bindable for Host {
    fn fields() -> Vec<tabula_bind::Field<Self>> {
        vec![
            tabula_bind::Field::converted::<std::net::Ipv4Addr>("addr", |h, v| h.addr = Some(v)),
            tabula_bind::Field::new::<u16>("port", |h, v| h.port = v),
        ]
    }
}

#[test]
fn test_converter_registry_fallback() {
    let table = parse_str("addr,port\n10.0.0.1,22\nnot-an-ip,80\n").unwrap();
    assert!(Binder::<Host>::for_table(&table).is_err());

    let mut registry = ConverterRegistry::new();
    registry.register::<std::net::Ipv4Addr, _>(|s| s.parse().ok());
    let binder = Binder::<Host>::build_with(&table.names()[..], &registry).unwrap();
    let hosts: Vec<Host> = binder.bind_rows(&table).unwrap().map(Result::unwrap).collect();
    assert_eq!(hosts[0].addr, Some(std::net::Ipv4Addr::new(10, 0, 0, 1)));
    assert_eq!(hosts[1].addr, None);
    assert_eq!(hosts[1].port, 80);
}

#[test]
fn test_binder_is_shared_across_threads() {
    let table = parse_str(PEOPLE).unwrap();
    let binder = std::sync::Arc::new(Binder::<Person>::for_table(&table).unwrap());
    let handles: Vec<_> = (0..table.num_rows())
        .map(|i| {
            let binder = binder.clone();
            let row = table.row(i).unwrap().to_detached();
            std::thread::spawn(move || binder.bind(&row).name)
        })
        .collect();
    let names: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(names, vec!["Bob", "Ed", "Sarah"]);
}

#[test]
fn test_missing_converter_is_rejected_for_unmatched_fields() {
    let table = parse_str("port\n22\n").unwrap();
    let err = Binder::<Host>::for_table(&table).unwrap_err();
    assert!(err.to_string().contains("no converter registered"));
}
