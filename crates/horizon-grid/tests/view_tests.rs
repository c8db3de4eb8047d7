//! End-to-end tests for loading, sorting, filtering, paging and mutation.

use std::collections::BTreeMap;

use horizon_grid::model::CompareValue;
use horizon_grid::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn states_view(config: GridConfig) -> TabularView {
    let mut view = TabularView::new(config);
    view.load_json(
        r#"{
            "fields": [
                {"index": 0, "title": "City"},
                {"index": 1, "title": "State"},
                {"index": 2, "title": "Population", "dataType": "int"},
                {"index": 3, "title": "Founded", "dataType": "date"}
            ],
            "rows": [
                {"cells": ["Los Angeles", "CA", "3898747", "1781-09-04"]},
                {"cells": ["New York", "NY", "8804190", "1624-01-01"]},
                {"cells": ["Houston", "TX", "2304580", "1837-06-05"]},
                {"cells": ["San Diego", "CA", "1386932", "1769-07-16"]},
                {"cells": ["Austin", "TX", "961855", "1839-12-27"]}
            ]
        }"#,
    )
    .expect("valid payload");
    view
}

fn cities(view: &TabularView) -> Vec<&str> {
    view.filtered_rows().filter_map(|r| r.display(0)).collect()
}

#[test]
fn test_stable_numeric_sort() {
    init_tracing();
    let mut view = TabularView::default();
    view.load(Payload::new(
        vec![
            FieldSpec::new("N").with_data_type(DataType::Int),
            FieldSpec::new("Tag").with_sortable(false),
        ],
        ["3", "1", "4", "1", "5"]
            .into_iter()
            .enumerate()
            .map(|(i, n)| RowSpec::from_values([n.to_string(), i.to_string()]))
            .collect(),
    ));
    view.sort(0, false);
    let values: Vec<(&str, &str)> = view
        .filtered_rows()
        .filter_map(|r| Some((r.display(0)?, r.display(1)?)))
        .collect();
    assert_eq!(values, [("1", "1"), ("1", "3"), ("3", "0"), ("4", "2"), ("5", "4")]);
}

#[test]
fn test_last_page_of_ten_rows() {
    let mut view = TabularView::new(GridConfig::default().with_rows_per_page(3));
    view.load(Payload::new(
        vec![FieldSpec::new("N").with_data_type(DataType::Int)],
        (1..=10).map(|n| RowSpec::from_values([n.to_string()])).collect(),
    ));
    assert_eq!(view.total_pages(), 4);
    assert_eq!(view.goto_page(3), 3);
    let page: Vec<&str> = view.page_rows().iter().filter_map(|r| r.display(0)).collect();
    assert_eq!(page, ["10"]);
}

#[test]
fn test_hidden_state_filter() {
    let mut view = states_view(GridConfig::default());
    view.filter_by_hidden_values(&[1], &["CA"], false);
    assert_eq!(cities(&view), ["New York", "Houston", "Austin"]);
}

#[test]
fn test_date_range_and_sort_compose() {
    let mut view = states_view(GridConfig::default());
    view.filter_by_range(3, Some("1700-01-01"), Some("1800-12-31"));
    view.sort(2, true);
    assert_eq!(cities(&view), ["Los Angeles", "San Diego"]);
    view.reset_filters();
    assert_eq!(cities(&view)[0], "New York");
}

#[test]
fn test_range_selection_replaces_everything_else() {
    let mut view = states_view(GridConfig::default());
    let ids = view.filtered_ids();
    view.click_row(ids[4], ClickModifiers::NONE);
    view.filter_by_hidden_values(&[1], &["TX"], false);
    view.click_row(ids[0], ClickModifiers::TOGGLE);
    view.click_row(ids[3], ClickModifiers::RANGE);

    // Los Angeles, New York, San Diego in display order; Austin (hidden) is
    // no longer selected.
    assert_eq!(view.selected_rows(), [ids[0], ids[1], ids[3]]);
}

#[test]
fn test_invalid_predicate_fails_closed() {
    init_tracing();
    let mut view = states_view(GridConfig::default());
    let expr = Expr::column(1).lt(Expr::int(3));
    let predicate = Predicate::compile(&expr, view.fields());
    assert!(!predicate.is_valid());
    assert!(predicate.error().is_some());
    assert_eq!(view.delete_rows(&predicate), 0);
    assert_eq!(view.row_count(), 5);
}

#[test]
fn test_coerced_predicate_update_and_delete() {
    let mut view = states_view(GridConfig::default());
    let texas = Predicate::compile(&Expr::column(1).eq(Expr::text("TX")), view.fields());
    let values = BTreeMap::from([(2, "1000000".to_string())]);
    assert_eq!(view.update_rows(&texas, &values), 2);

    let small = Predicate::compile(
        &Expr::column(2).le(Expr::coerce("1000000")),
        view.fields(),
    );
    assert!(small.is_valid());
    assert_eq!(view.delete_rows(&small), 2);
    assert_eq!(cities(&view), ["Los Angeles", "New York", "San Diego"]);
}

#[test]
fn test_invalid_cells_are_kept_and_reported() {
    let mut view = TabularView::default();
    view.load_csv("name,qty\nA,1\nB,many\nC,3", &CsvOptions::default())
        .expect("valid csv");
    assert_eq!(view.row_count(), 3);
    assert!(view.invalid_rows().is_empty());

    let mut typed = TabularView::default();
    typed.load(Payload::new(
        vec![
            FieldSpec::new("name"),
            FieldSpec::new("qty").with_data_type(DataType::Int),
        ],
        vec![
            RowSpec::from_values(["A", "1"]),
            RowSpec::from_values(["B", "many"]),
        ],
    ));
    let invalid = typed.invalid_cells();
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].original_value(), "many");
    assert!(typed.rows()[1].is_invalid());
    assert_eq!(typed.rows()[0].value(1), Some(&CompareValue::Int(1)));
}

#[test]
fn test_config_from_toml_drives_view() {
    let config = GridConfig::from_toml_str(
        r#"
        rows-per-page = 2
        selection-mode = "single"

        [initial-sort]
        column = 2
        "#,
    )
    .expect("valid config");
    let view = states_view(config);
    assert_eq!(view.total_pages(), 3);
    let page: Vec<&str> = view.page_rows().iter().filter_map(|r| r.display(0)).collect();
    assert_eq!(page, ["Austin", "San Diego"]);
}

#[test]
fn test_registry_holds_views() {
    let mut registry = ViewRegistry::new();
    let key = registry
        .insert_named("cities", states_view(GridConfig::default()))
        .expect("unique name");
    let view = registry.get_by_name_mut("cities").expect("registered");
    view.filter_by_text("San", Some(&[0][..]));
    assert_eq!(registry.get(key).map(TabularView::filtered_count), Some(1));
}
