//! Tests for view notifications, deferred rendering and remote paging.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use horizon_grid::model::SortState;
use horizon_grid::prelude::*;
use horizon_grid::source::FetchRequest;

fn payload(count: usize) -> Payload {
    Payload::new(
        vec![
            FieldSpec::new("N").with_data_type(DataType::Int),
            FieldSpec::new("Label"),
        ],
        (1..=count)
            .map(|n| RowSpec::from_values([n.to_string(), format!("row {n}")]))
            .collect(),
    )
}

fn counter() -> (Arc<AtomicUsize>, impl Fn(&Arc<horizon_grid::view::Frame>) + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let sink = count.clone();
    (count, move |_: &Arc<horizon_grid::view::Frame>| {
        sink.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_initialized_then_refreshed() {
    let mut view = TabularView::default();
    let (initialized, on_init) = counter();
    let (refreshed, on_refresh) = counter();
    view.signals().view_initialized.connect(on_init);
    view.signals().view_refreshed.connect(on_refresh);

    view.load(payload(3));
    view.sort(0, true);
    view.goto_page(0);

    assert_eq!(initialized.load(Ordering::SeqCst), 1);
    assert_eq!(refreshed.load(Ordering::SeqCst), 1);
    let frame = view.frame().expect("rendered");
    assert_eq!(frame.rows[0].texts(), ["3", "row 3"]);
    assert_eq!(frame.columns[0].sort_state, SortState::Descending);
}

#[test]
fn test_deferred_render_coalesces() {
    let mut view = TabularView::new(
        GridConfig::default()
            .with_deferred_render(true)
            .with_rows_per_page(2),
    );
    let (initialized, on_init) = counter();
    let (refreshed, on_refresh) = counter();
    view.signals().view_initialized.connect(on_init);
    view.signals().view_refreshed.connect(on_refresh);
    let busy = Arc::new(Mutex::new(Vec::new()));
    let sink = busy.clone();
    view.signals()
        .busy_changed
        .connect(move |state| sink.lock().push(*state));

    view.load(payload(5));
    assert!(view.tick());
    assert_eq!(initialized.load(Ordering::SeqCst), 1);

    view.sort(0, true);
    view.filter_by_hidden_values(&[0], &["5"], false);
    view.goto_page(1);
    assert!(view.is_busy());
    assert!(view.render_pending());
    assert_eq!(refreshed.load(Ordering::SeqCst), 0);

    assert!(view.tick());
    assert!(!view.tick());
    assert_eq!(refreshed.load(Ordering::SeqCst), 1);
    assert!(!view.is_busy());

    let frame = view.frame().expect("rendered");
    assert_eq!(frame.page, 1);
    assert_eq!(frame.rows[0].texts(), ["2", "row 2"]);
    assert_eq!(*busy.lock(), [true, false, true, false]);
}

#[test]
fn test_sort_and_page_signals() {
    let mut view = TabularView::new(GridConfig::default().with_rows_per_page(1));
    view.load(payload(3));
    let sorts = Arc::new(Mutex::new(Vec::new()));
    let pages = Arc::new(Mutex::new(Vec::new()));
    let sort_sink = sorts.clone();
    let page_sink = pages.clone();
    view.signals()
        .sort_changed
        .connect(move |change| sort_sink.lock().push(*change));
    view.signals()
        .page_changed
        .connect(move |page| page_sink.lock().push(*page));

    view.sort(1, false);
    view.goto_page(2);
    view.clear_sort();
    view.filter_by_text("row", None);

    assert_eq!(*sorts.lock(), [(1, SortState::Ascending), (1, SortState::None)]);
    assert_eq!(*pages.lock(), [2, 0]);
}

#[test]
fn test_blocked_signals_stay_silent() {
    let mut view = TabularView::default();
    let (refreshed, on_refresh) = counter();
    let _guard = view.signals().view_refreshed.connect_scoped(on_refresh);
    view.load(payload(2));

    view.signals().set_blocked(true);
    view.sort(0, false);
    view.signals().set_blocked(false);
    view.sort(0, true);
    assert_eq!(refreshed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_stale_fetch_is_ignored() {
    let requests = Arc::new(Mutex::new(Vec::<FetchRequest>::new()));
    let sink = requests.clone();
    let mut view = TabularView::new(
        GridConfig::default()
            .with_rows_per_page(2)
            .with_paging(PagingMode::Remote),
    );
    view.set_fetcher(Box::new(move |request: &FetchRequest| {
        sink.lock().push(request.clone());
    }));
    let mut first = payload(2);
    first.total_row_count = Some(6);
    view.load(first);

    view.goto_page(1);
    view.goto_page(2);
    let (old, new) = {
        let requests = requests.lock();
        assert_eq!(requests.len(), 2);
        (requests[0].token, requests[1].token)
    };

    let mut late = Payload::new(Vec::new(), vec![RowSpec::from_values(["3", "row 3"])]);
    late.total_row_count = Some(6);
    late.current_page = Some(1);
    assert!(!view.complete_fetch(old, late));
    assert!(view.is_busy());
    assert_eq!(view.current_page(), 0);

    let mut fresh = Payload::new(Vec::new(), vec![RowSpec::from_values(["5", "row 5"])]);
    fresh.total_row_count = Some(6);
    fresh.current_page = Some(2);
    assert!(view.complete_fetch(new, fresh));
    assert!(!view.is_busy());
    assert_eq!(view.current_page(), 2);
    assert_eq!(view.total_pages(), 3);
    let frame = view.frame().expect("rendered");
    assert_eq!(frame.rows[0].texts(), ["5", "row 5"]);
}
