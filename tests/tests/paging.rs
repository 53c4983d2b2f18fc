use tests::{tests, TestDb};
use trivet::{Direction, Entity, Page, Query};

fn seed(t: &TestDb, rows: i64) -> String {
    let table = t.create_table("item", "id BIGINT, label TEXT");

    let records: Vec<_> = (0..rows)
        .map(|id| {
            Entity::create(&table)
                .set("id", id)
                .set("label", format!("item {id}"))
        })
        .collect();
    t.db().insert_batch(&records).unwrap();

    table
}

fn page_carries_totals_and_flags(t: TestDb) {
    let table = seed(&t, 45);
    let db = t.db();

    let first = db
        .page(&Query::table(&table).paged(Page::new(0, 20).order_by("id", Direction::Asc)))
        .unwrap();

    assert_eq!(first.total(), 45);
    assert_eq!(first.total_pages(), 3);
    assert!(first.is_first());
    assert!(!first.is_last());
    assert_eq!(first.len(), 20);
    assert_eq!(first.items()[0].get("id"), Some(&0i64.into()));

    let last = db
        .page(&Query::table(&table).paged(Page::new(2, 20).order_by("id", Direction::Asc)))
        .unwrap();

    assert!(last.is_last());
    assert!(!last.is_first());
    assert_eq!(last.len(), 5);
    assert_eq!(last.items()[0].get("id"), Some(&40i64.into()));
}

fn page_respects_conditions(t: TestDb) {
    let table = seed(&t, 30);
    let db = t.db();

    let query = Query::table(&table)
        .condition(trivet::Condition::lt("id", 10i64))
        .paged(Page::new(0, 4).order_by("id", Direction::Asc));
    let result = db.page(&query).unwrap();

    assert_eq!(result.total(), 10);
    assert_eq!(result.total_pages(), 3);
    assert_eq!(result.len(), 4);
}

fn page_orders_descending(t: TestDb) {
    let table = seed(&t, 10);
    let db = t.db();

    let result = db
        .page(&Query::table(&table).paged(Page::new(0, 3).order_by("id", Direction::Desc)))
        .unwrap();

    assert_eq!(result.items()[0].get("id"), Some(&9i64.into()));
    assert_eq!(result.items()[2].get("id"), Some(&7i64.into()));
}

fn unbounded_query_is_a_single_page(t: TestDb) {
    let table = seed(&t, 7);
    let db = t.db();

    let result = db.page(&Query::table(&table)).unwrap();

    assert_eq!(result.total(), 7);
    assert_eq!(result.total_pages(), 1);
    assert!(result.is_first());
    assert!(result.is_last());
    assert_eq!(result.len(), 7);
}

tests!(
    page_carries_totals_and_flags,
    page_respects_conditions,
    page_orders_descending,
    unbounded_query_is_a_single_page,
);
