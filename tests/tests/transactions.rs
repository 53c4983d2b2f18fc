use tests::{tests, TestDb};
use trivet::{Entity, IsolationLevel};
use trivet_core::err;

fn user(table: &str, id: i64, name: &str) -> Entity {
    Entity::create(table).set("id", id).set("name", name)
}

fn tx_commits_atomically(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();

    db.tx(|db| {
        db.insert(&user(&table, 1, "alice"))?;
        db.insert(&user(&table, 2, "bob"))?;
        Ok(())
    })
    .unwrap();

    assert_eq!(db.count(&Entity::create(&table)).unwrap(), 2);
    assert_eq!(db.cache().cached_connections(), 0);
}

fn tx_rolls_back_on_error(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();

    let err = db
        .tx(|db| {
            db.insert(&user(&table, 1, "alice"))?;
            Err::<(), _>(err!("boom"))
        })
        .unwrap_err();

    assert_eq!(err.to_string(), "boom");
    // No partial writes survive the rollback
    assert_eq!(db.count(&Entity::create(&table)).unwrap(), 0);
    assert_eq!(db.cache().cached_connections(), 0);
}

fn tx_restores_auto_commit(t: TestDb) {
    let db = t.db();
    let pinned = db.connection().unwrap();

    db.tx(|_| Ok(())).unwrap();
    assert!(pinned.lock().auto_commit());

    // The successful tx released the connection, so pin the next one anew
    let pinned = db.connection().unwrap();
    let _ = db.tx(|_| Err::<(), _>(err!("boom")));
    assert!(pinned.lock().auto_commit());
}

fn nested_tx_shares_the_transaction(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();
    let mut handles = vec![];

    db.tx(|db| {
        handles.push(db.connection()?);
        db.insert(&user(&table, 1, "alice"))?;

        db.tx(|db| {
            handles.push(db.connection()?);
            db.insert(&user(&table, 2, "bob")).map(|_| ())
        })?;

        db.insert(&user(&table, 3, "carol"))?;
        Ok(())
    })
    .unwrap();

    assert!(handles[0].same_connection(&handles[1]));
    assert_eq!(db.count(&Entity::create(&table)).unwrap(), 3);
}

fn tx_with_isolation_never_lowers(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();

    // Serializable is the strictest level, so this raises where needed and
    // is a no-op where the connection already runs serializable
    db.tx_with_isolation(IsolationLevel::Serializable, |db| {
        db.insert(&user(&table, 1, "alice")).map(|_| ())
    })
    .unwrap();

    assert_eq!(db.count(&Entity::create(&table)).unwrap(), 1);
}

fn session_commit_and_rollback(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();
    let mut session = db.session().unwrap();

    session.begin().unwrap();
    session.insert(&user(&table, 1, "alice")).unwrap();
    session.commit().unwrap();

    session.begin().unwrap();
    session.insert(&user(&table, 2, "bob")).unwrap();
    session.rollback().unwrap();
    drop(session);

    let names = db.find_all(&Entity::create(&table)).unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].get("name"), Some(&"alice".into()));
}

fn savepoint_discards_inner_work_only(t: TestDb) {
    if !t.capability().savepoints {
        return;
    }

    let table = t.create_table("user", "id BIGINT, name TEXT");
    let db = t.db();
    let mut session = db.session().unwrap();

    session.begin().unwrap();
    session.insert(&user(&table, 1, "alice")).unwrap();

    let checkpoint = session.savepoint().unwrap();
    session.insert(&user(&table, 2, "bob")).unwrap();
    session.rollback_to(&checkpoint).unwrap();

    session.commit().unwrap();
    drop(session);

    let rows = db.find_all(&Entity::create(&table)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&"alice".into()));
}

fn unsupported_isolation_is_refused(t: TestDb) {
    let db = t.db();
    let mut session = db.session().unwrap();

    // Every shipped driver lacks at least one of the four levels
    let unsupported = [
        IsolationLevel::ReadUncommitted,
        IsolationLevel::ReadCommitted,
        IsolationLevel::RepeatableRead,
        IsolationLevel::Serializable,
    ]
    .into_iter()
    .find(|level| !t.capability().supports_isolation(*level))
    .expect("driver supports every isolation level");

    let err = session.set_isolation(unsupported).unwrap_err();
    assert!(err.is_unsupported_feature());
}

tests!(
    tx_commits_atomically,
    tx_rolls_back_on_error,
    tx_restores_auto_commit,
    nested_tx_shares_the_transaction,
    tx_with_isolation_never_lowers,
    session_commit_and_rollback,
    savepoint_discards_inner_work_only,
    unsupported_isolation_is_refused,
);
