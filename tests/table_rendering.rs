//! Table Rendering Tests
//!
//! Layout properties of `render` that hold for any result set: aligned
//! columns, a dash divider matching each column width, blank nulls.

use pretty_assertions::assert_eq;
use roster::table::{render, NO_RESULTS};
use roster::ResultSet;
use serde_json::{json, Value};
use unicode_width::UnicodeWidthStr;

fn employees() -> ResultSet {
    let mut rows =
        ResultSet::new(["id", "first_name", "last_name", "title", "salary", "manager"]).unwrap();
    for row in [
        vec![json!(1), json!("John"), json!("Doe"), json!("Sales Lead"), json!(100000), Value::Null],
        vec![
            json!(2),
            json!("Mike"),
            json!("Chan"),
            json!("Salesperson"),
            json!(80000),
            json!("John Doe"),
        ],
        vec![json!(12), json!("Zoë"), json!("Ōta"), Value::Null, json!(55000.5), json!("John Doe")],
    ] {
        rows.push_row(row).unwrap();
    }
    rows
}

#[test]
fn test_every_line_has_the_same_width() {
    let text = render(&employees());
    let widths: Vec<usize> = text.lines().map(UnicodeWidthStr::width).collect();

    assert_eq!(widths.len(), 5);
    assert!(widths.iter().all(|w| *w == widths[0]), "uneven lines: {widths:?}");
}

#[test]
fn test_divider_matches_column_widths() {
    let text = render(&employees());
    let lines: Vec<&str> = text.lines().collect();

    let dash_runs: Vec<usize> = lines[1].split(' ').map(str::len).collect();
    assert_eq!(dash_runs, vec![2, 10, 9, 11, 7, 8]);
    assert!(lines[1].chars().all(|c| c == '-' || c == ' '));
}

#[test]
fn test_cells_start_at_column_offsets() {
    let text = render(&employees());
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines[0].starts_with("id first_name last_name title       salary  manager"));
    assert!(lines[2].starts_with("1  John       Doe       Sales Lead  100000"));
    assert!(lines[3].ends_with("John Doe"));
}

#[test]
fn test_null_renders_blank() {
    let text = render(&employees());
    let first_row = text.lines().nth(2).unwrap();

    assert!(!first_row.contains("null"));
    assert!(first_row.ends_with(' '));
}

#[test]
fn test_wide_characters_stay_aligned() {
    let rows = ResultSet::new(["name", "n"])
        .unwrap()
        .with_row(vec![json!("東京"), json!(1)])
        .unwrap()
        .with_row(vec![json!("Oslo"), json!(2)])
        .unwrap();

    assert_eq!(render(&rows), "name n\n---- -\n東京 1\nOslo 2");
}

#[test]
fn test_empty_result_set() {
    let rows = ResultSet::new(["id", "name"]).unwrap();
    assert_eq!(render(&rows), NO_RESULTS);
}

#[test]
fn test_no_trailing_newline() {
    assert!(!render(&employees()).ends_with('\n'));
}
