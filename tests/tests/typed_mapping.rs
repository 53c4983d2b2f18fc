use serde::{Deserialize, Serialize};
use tests::{tests, TestDb};
use trivet::{from_entity, to_entity, Entity};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct User {
    id: i64,
    name: String,
    age: Option<i64>,
}

fn typed_records_round_trip_through_the_database(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT, age BIGINT");
    let db = t.db();

    let alice = User {
        id: 1,
        name: "alice".into(),
        age: Some(32),
    };
    let bob = User {
        id: 2,
        name: "bob".into(),
        age: None,
    };

    db.insert(&to_entity(&table, &alice).unwrap()).unwrap();
    db.insert(&to_entity(&table, &bob).unwrap()).unwrap();

    let row = db
        .get(&Entity::create(&table).set("id", 1i64))
        .unwrap()
        .unwrap();
    assert_eq!(from_entity::<User>(&row).unwrap(), alice);

    let row = db
        .get(&Entity::create(&table).set("id", 2i64))
        .unwrap()
        .unwrap();
    assert_eq!(from_entity::<User>(&row).unwrap(), bob);
}

fn typed_lists_map_every_row(t: TestDb) {
    let table = t.create_table("user", "id BIGINT, name TEXT, age BIGINT");
    let db = t.db();

    for id in 0..3i64 {
        let user = User {
            id,
            name: format!("user {id}"),
            age: Some(20 + id),
        };
        db.insert(&to_entity(&table, &user).unwrap()).unwrap();
    }

    let users: Vec<User> = db
        .find_all(&Entity::create(&table))
        .unwrap()
        .iter()
        .map(|row| from_entity(row).unwrap())
        .collect();

    assert_eq!(users.len(), 3);
    assert!(users.iter().any(|user| user.name == "user 2"));
}

tests!(
    typed_records_round_trip_through_the_database,
    typed_lists_map_every_row,
);
