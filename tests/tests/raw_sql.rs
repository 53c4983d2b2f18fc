use tests::{tests, TestDb};
use trivet::{ColumnListHandler, Entity, Rows, StringHandler};

fn seed(t: &TestDb) -> String {
    let table = t.create_table("user", "id BIGINT, name TEXT");

    t.db()
        .insert_batch(&[
            Entity::create(&table).set("id", 1i64).set("name", "alice"),
            Entity::create(&table).set("id", 2i64).set("name", "bob"),
            Entity::create(&table).set("id", 3i64).set("name", "carol"),
        ])
        .unwrap();

    table
}

fn raw_queries_return_entities(t: TestDb) {
    let table = seed(&t);

    let rows = t
        .db()
        .query(&format!("SELECT id, name FROM {table} ORDER BY id"), &[])
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("name"), Some(&"alice".into()));
    assert_eq!(rows[2].get("id"), Some(&3i64.into()));
}

fn handlers_shape_raw_results(t: TestDb) {
    let table = seed(&t);
    let db = t.db();

    let n = db
        .query_number(&format!("SELECT COUNT(*) FROM {table}"), &[])
        .unwrap();
    assert_eq!(n, 3);

    let first = db
        .query_with(
            &format!("SELECT name FROM {table} ORDER BY id"),
            &[],
            StringHandler,
        )
        .unwrap();
    assert_eq!(first, Some("alice".into()));

    let names = db
        .query_with(
            &format!("SELECT name FROM {table} ORDER BY id DESC"),
            &[],
            ColumnListHandler,
        )
        .unwrap();
    assert_eq!(names.len(), 3);
    assert_eq!(names[0], "carol".into());
}

fn count_by_sql_ignores_trailing_order_by(t: TestDb) {
    let table = seed(&t);

    let total = t
        .db()
        .count_by_sql(&format!("SELECT * FROM {table} ORDER BY id DESC"), &[])
        .unwrap();

    assert_eq!(total, 3);
}

fn closures_shape_raw_results(t: TestDb) {
    let table = seed(&t);

    let ids: Vec<i64> = t
        .db()
        .query_with(&format!("SELECT id FROM {table} ORDER BY id"), &[], |rows: Rows| {
            rows.map(|row| {
                row.get("id")
                    .cloned()
                    .unwrap_or_default()
                    .to_i64()
            })
            .collect()
        })
        .unwrap();

    assert_eq!(ids, [1, 2, 3]);
}

tests!(
    raw_queries_return_entities,
    handlers_shape_raw_results,
    count_by_sql_ignores_trailing_order_by,
    closures_shape_raw_results,
);
