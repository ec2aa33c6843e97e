//! End-to-end tests: models and query sets over a real SQLite database.

use std::sync::OnceLock;

use ferrite_orm::{
    CharField, ForeignKeyField, Instance, Model, ModelSchema, NumberField, OrmError,
    PrimaryKeyField, QuerySet, ReverseField, Value,
};
use ferrite_sqlite::SqliteConnection;

struct Author;

impl Model for Author {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            ModelSchema::builder("Author")
                .field("id", PrimaryKeyField::new())
                .field("name", CharField::new(64))
                .field("books", ReverseField::new(Book::schema, "author"))
                .build()
                .expect("author schema")
        })
    }
}

struct Book;

impl Model for Book {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            ModelSchema::builder("Book")
                .field("id", PrimaryKeyField::new())
                .field("title", CharField::new(64))
                .field("year", NumberField::new())
                .field("author", ForeignKeyField::new(Author::schema))
                .build()
                .expect("book schema")
        })
    }
}

fn setup() -> SqliteConnection {
    let mut conn = SqliteConnection::open_in_memory().expect("open");
    conn.execute_batch(
        "CREATE TABLE author (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             name TEXT
         );
         CREATE TABLE book (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             title TEXT,
             year INTEGER,
             author_id INTEGER REFERENCES author (id)
         );",
    )
    .expect("schema");
    conn
}

fn author(conn: &mut SqliteConnection, name: &str) -> Instance<Author> {
    let mut author = Instance::<Author>::new();
    author
        .set("name", Value::Text(name.into()), conn)
        .expect("set name");
    author.save(conn).expect("save author");
    author
}

fn book(
    conn: &mut SqliteConnection,
    title: &str,
    year: i64,
    by: &Instance<Author>,
) -> Instance<Book> {
    let mut book = Instance::<Book>::new();
    book.set("title", Value::Text(title.into()), conn)
        .expect("set title");
    book.set("year", Value::Int(year), conn).expect("set year");
    book.set_related("author", by).expect("set author");
    book.save(conn).expect("save book");
    book
}

#[test]
fn test_insert_assigns_primary_key() {
    let mut conn = setup();
    let herbert = author(&mut conn, "Frank Herbert");
    assert_eq!(herbert.pk(), Some(1));

    let asimov = author(&mut conn, "Isaac Asimov");
    assert_eq!(asimov.pk(), Some(2));
}

#[test]
fn test_fetch_round_trip() {
    let mut conn = setup();
    let herbert = author(&mut conn, "Frank Herbert");
    let dune = book(&mut conn, "Dune", 1965, &herbert);

    let fetched = Book::objects()
        .get(&mut conn, dune.pk().expect("pk"))
        .expect("get")
        .expect("row");
    assert_eq!(fetched.get("title").expect("title"), &Value::Text("Dune".into()));
    assert_eq!(fetched.get("year").expect("year"), &Value::Int(1965));
    // hydration leaves nothing edited
    assert_eq!(fetched.edited().count(), 0);

    let related: Instance<Author> = fetched
        .related("author", &mut conn)
        .expect("related")
        .expect("author");
    assert_eq!(related.pk(), herbert.pk());
}

#[test]
fn test_update_writes_only_edited_fields() {
    let mut conn = setup();
    let herbert = author(&mut conn, "Frank Herbert");
    let mut dune = book(&mut conn, "Dune", 1965, &herbert);

    dune.set("year", Value::Int(1966), &mut conn).expect("set");
    dune.save(&mut conn).expect("save");

    let fetched = Book::objects()
        .get(&mut conn, dune.pk().expect("pk"))
        .expect("get")
        .expect("row");
    assert_eq!(fetched.get("year").expect("year"), &Value::Int(1966));
    assert_eq!(fetched.get("title").expect("title"), &Value::Text("Dune".into()));
}

#[test]
fn test_clean_save_is_a_no_op() {
    let mut conn = setup();
    let mut herbert = author(&mut conn, "Frank Herbert");
    // second save with nothing edited must not fail or duplicate
    herbert.save(&mut conn).expect("save");
    let mut all = Author::objects().all();
    assert_eq!(QuerySet::count(&mut all, &mut conn).expect("count"), 1);
}

#[test]
fn test_join_filter() {
    let mut conn = setup();
    let herbert = author(&mut conn, "Frank Herbert");
    let asimov = author(&mut conn, "Isaac Asimov");
    book(&mut conn, "Dune", 1965, &herbert);
    book(&mut conn, "Foundation", 1951, &asimov);
    book(&mut conn, "I, Robot", 1950, &asimov);

    let mut by_asimov = Book::objects()
        .filter([("author__name__startswith", "Isaac")])
        .expect("filter");
    assert_eq!(QuerySet::count(&mut by_asimov, &mut conn).expect("count"), 2);
}

#[test]
fn test_filter_by_instance_binds_primary_key() {
    let mut conn = setup();
    let herbert = author(&mut conn, "Frank Herbert");
    let asimov = author(&mut conn, "Isaac Asimov");
    book(&mut conn, "Dune", 1965, &herbert);
    book(&mut conn, "Foundation", 1951, &asimov);
    book(&mut conn, "I, Robot", 1950, &asimov);

    let mut by_asimov = Book::objects().filter([("author", &asimov)]).expect("filter");
    assert_eq!(QuerySet::count(&mut by_asimov, &mut conn).expect("count"), 2);
}

#[test]
fn test_reverse_relation() {
    let mut conn = setup();
    let herbert = author(&mut conn, "Frank Herbert");
    let asimov = author(&mut conn, "Isaac Asimov");
    book(&mut conn, "Dune", 1965, &herbert);
    book(&mut conn, "Foundation", 1951, &asimov);
    book(&mut conn, "I, Robot", 1950, &asimov);

    let mut books = asimov.reverse::<Book>("books").expect("reverse");
    assert_eq!(QuerySet::count(&mut books, &mut conn).expect("count"), 2);
}

#[test]
fn test_exclude_and_order() {
    let mut conn = setup();
    let asimov = author(&mut conn, "Isaac Asimov");
    book(&mut conn, "Foundation", 1951, &asimov);
    book(&mut conn, "I, Robot", 1950, &asimov);
    book(&mut conn, "The Gods Themselves", 1972, &asimov);

    let titles: Vec<_> = Book::objects()
        .exclude([("year__gt", 1960)])
        .expect("exclude")
        .order_by(&["-year"])
        .expect("order_by")
        .to_vec(&mut conn)
        .expect("to_vec")
        .into_iter()
        .map(|b| b.get("title").expect("title").clone())
        .collect();
    assert_eq!(
        titles,
        vec![
            Value::Text("Foundation".into()),
            Value::Text("I, Robot".into()),
        ]
    );
}

#[test]
fn test_get_multiple_results() {
    let mut conn = setup();
    let asimov = author(&mut conn, "Isaac Asimov");
    book(&mut conn, "Foundation", 1951, &asimov);
    book(&mut conn, "I, Robot", 1950, &asimov);

    let err = Book::objects()
        .get_with(&mut conn, ("author__name", "Isaac Asimov"))
        .unwrap_err();
    assert!(matches!(err, OrmError::MultipleResults));
}

#[test]
fn test_get_missing_row() {
    let mut conn = setup();
    assert!(Book::objects().get(&mut conn, 999).expect("get").is_none());
}

#[test]
fn test_unresolved_foreign_key() {
    let mut conn = setup();
    let mut orphan = Instance::<Book>::new();
    let err = orphan
        .set("author", Value::Int(999), &mut conn)
        .unwrap_err();
    assert!(matches!(
        err,
        OrmError::UnresolvedForeignKey { pk: 999, .. }
    ));
}

#[test]
fn test_delete() {
    let mut conn = setup();
    let mut herbert = author(&mut conn, "Frank Herbert");
    let pk = herbert.pk().expect("pk");

    assert_eq!(herbert.delete(&mut conn).expect("delete"), 1);
    assert_eq!(herbert.pk(), None);
    assert!(Author::objects().get(&mut conn, pk).expect("get").is_none());

    // deleting an unsaved instance issues nothing and affects nothing
    assert_eq!(herbert.delete(&mut conn).expect("delete"), 0);
}
