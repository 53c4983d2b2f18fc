use tests::{tests, TestDb};
use trivet::{Entity, LikeType, Value};

fn insert_then_find_returns_the_row(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();

    db.insert(&Entity::create(&table).set("id", 1i64).set("name", "alice"))
        .unwrap();

    let found = db
        .find_all(&Entity::create(&table).set("name", "alice"))
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get("name"), Some(&"alice".into()));
    assert_eq!(found[0].get("id"), Some(&1i64.into()));
}

fn get_returns_the_first_match_or_none(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();

    db.insert(&Entity::create(&table).set("id", 1i64).set("name", "alice"))
        .unwrap();

    let alice = db
        .get(&Entity::create(&table).set("name", "alice"))
        .unwrap();
    assert!(alice.is_some());

    let nobody = db
        .get(&Entity::create(&table).set("name", "nobody"))
        .unwrap();
    assert!(nobody.is_none());
}

fn update_touches_only_matching_rows(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT, age BIGINT");
    let db = t.db();

    db.insert_batch(&[
        Entity::create(&table).set("id", 1i64).set("name", "alice").set("age", 32i64),
        Entity::create(&table).set("id", 2i64).set("name", "bob").set("age", 40i64),
    ])
    .unwrap();

    let affected = db
        .update(
            &Entity::new().set("age", 33i64),
            &Entity::create(&table).set("name", "alice"),
        )
        .unwrap();
    assert_eq!(affected, 1);

    let alice = db
        .get(&Entity::create(&table).set("name", "alice"))
        .unwrap()
        .unwrap();
    assert_eq!(alice.get("age"), Some(&33i64.into()));

    let bob = db
        .get(&Entity::create(&table).set("name", "bob"))
        .unwrap()
        .unwrap();
    assert_eq!(bob.get("age"), Some(&40i64.into()));
}

fn delete_removes_only_matching_rows(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();

    db.insert_batch(&[
        Entity::create(&table).set("id", 1i64).set("name", "alice"),
        Entity::create(&table).set("id", 2i64).set("name", "bob"),
    ])
    .unwrap();

    let affected = db.del(&Entity::create(&table).set("name", "bob")).unwrap();
    assert_eq!(affected, 1);
    assert_eq!(db.count(&Entity::create(&table)).unwrap(), 1);
}

fn batch_insert_reports_per_row_counts(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT, age BIGINT");
    let db = t.db();

    let affected = db
        .insert_batch(&[
            Entity::create(&table).set("id", 1i64).set("name", "alice").set("age", 32i64),
            // Missing fields bind NULL
            Entity::create(&table).set("id", 2i64).set("name", "bob"),
            Entity::create(&table).set("id", 3i64).set("name", "carol").set("age", 28i64),
        ])
        .unwrap();

    assert_eq!(affected, [1, 1, 1]);

    let bob = db
        .get(&Entity::create(&table).set("name", "bob"))
        .unwrap()
        .unwrap();
    assert_eq!(bob.get("age"), Some(&Value::Null));
}

fn insert_or_update_picks_the_right_branch(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();

    // No matching key: insert
    db.insert_or_update(
        &Entity::create(&table).set("id", 1i64).set("name", "alice"),
        &["id"],
    )
    .unwrap();
    assert_eq!(db.count(&Entity::create(&table)).unwrap(), 1);

    // Matching key: update in place
    db.insert_or_update(
        &Entity::create(&table).set("id", 1i64).set("name", "alicia"),
        &["id"],
    )
    .unwrap();

    assert_eq!(db.count(&Entity::create(&table)).unwrap(), 1);
    let row = db
        .get(&Entity::create(&table).set("id", 1i64))
        .unwrap()
        .unwrap();
    assert_eq!(row.get("name"), Some(&"alicia".into()));
}

fn upsert_inserts_and_updates_in_one_statement(t: TestDb) {
    let table = t.create_table("user", "id BIGINT PRIMARY KEY, name TEXT");
    let db = t.db();

    db.upsert(
        &Entity::create(&table).set("id", 1i64).set("name", "alice"),
        &["id"],
    )
    .unwrap();
    db.upsert(
        &Entity::create(&table).set("id", 1i64).set("name", "alicia"),
        &["id"],
    )
    .unwrap();

    assert_eq!(db.count(&Entity::create(&table)).unwrap(), 1);
    let row = db
        .get(&Entity::create(&table).set("id", 1i64))
        .unwrap()
        .unwrap();
    assert_eq!(row.get("name"), Some(&"alicia".into()));
}

fn generated_keys_follow_capability(t: TestDb) {
    let db = t.db();

    if t.capability().last_insert_id {
        let table = t.create_table("user", "id INTEGER PRIMARY KEY, name TEXT");

        let id = db
            .insert_for_generated_key(&Entity::create(&table).set("name", "alice"))
            .unwrap();
        assert_eq!(id, 1);
    } else {
        let table = t.create_table("user", "id BIGINT, name TEXT");

        let err = db
            .insert_for_generated_key(
                &Entity::create(&table).set("id", 1i64).set("name", "alice"),
            )
            .unwrap_err();
        assert!(err.is_unsupported_feature());
    }
}

fn find_helpers_match_their_conditions(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();

    db.insert_batch(&[
        Entity::create(&table).set("id", 1i64).set("name", "alice"),
        Entity::create(&table).set("id", 2i64).set("name", "alan"),
        Entity::create(&table).set("id", 3i64).set("name", "bob"),
    ])
    .unwrap();

    assert_eq!(db.find_by(&table, "name", "bob").unwrap().len(), 1);

    let al = db
        .find_like(&table, "name", "al", LikeType::StartsWith)
        .unwrap();
    assert_eq!(al.len(), 2);

    let picked = db
        .find_in(&table, "id", vec![1i64.into(), 3i64.into()])
        .unwrap();
    assert_eq!(picked.len(), 2);
}

fn condition_expressions_parse_from_entities(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT, age BIGINT");
    let db = t.db();

    db.insert_batch(&[
        Entity::create(&table).set("id", 1i64).set("name", "alice").set("age", 32i64),
        Entity::create(&table).set("id", 2i64).set("name", "bob").set("age", 17i64),
        Entity::create(&table).set("id", 3i64).set("name", "carol"),
    ])
    .unwrap();

    let adults = db
        .find_all(&Entity::create(&table).set("age", ">= 18"))
        .unwrap();
    assert_eq!(adults.len(), 1);
    assert_eq!(adults[0].get("name"), Some(&"alice".into()));

    let ageless = db
        .find_all(&Entity::create(&table).set("age", Value::Null))
        .unwrap();
    assert_eq!(ageless.len(), 1);
    assert_eq!(ageless[0].get("name"), Some(&"carol".into()));
}

fn duplicate_keys_are_constraint_violations(t: TestDb) {
    let table = t.create_table("user", "id BIGINT PRIMARY KEY, name TEXT");
    let db = t.db();

    db.insert(&Entity::create(&table).set("id", 1i64).set("name", "alice"))
        .unwrap();
    let err = db
        .insert(&Entity::create(&table).set("id", 1i64).set("name", "bob"))
        .unwrap_err();

    assert!(err.is_constraint_violation(), "{err}");
}

tests!(
    insert_then_find_returns_the_row,
    get_returns_the_first_match_or_none,
    update_touches_only_matching_rows,
    delete_removes_only_matching_rows,
    batch_insert_reports_per_row_counts,
    insert_or_update_picks_the_right_branch,
    upsert_inserts_and_updates_in_one_statement,
    generated_keys_follow_capability,
    find_helpers_match_their_conditions,
    condition_expressions_parse_from_entities,
    duplicate_keys_are_constraint_violations,
);
