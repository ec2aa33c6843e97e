//! Relationship tests: typed accessors and foreign-key resolution.

use std::sync::OnceLock;

use ferrite_core::testing::{CannedResult, ScriptedConnection};
use ferrite_orm::{
    CharField, ForeignKeyField, Instance, Model, ModelSchema, OrmError, PrimaryKeyField,
    ReverseField, Value,
};

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
                .field("author", ForeignKeyField::new(Author::schema))
                .build()
                .expect("book schema")
        })
    }
}

struct Publisher;

impl Model for Publisher {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            ModelSchema::builder("Publisher")
                .field("id", PrimaryKeyField::new())
                .build()
                .expect("publisher schema")
        })
    }
}

fn saved_author(conn: &mut ScriptedConnection, pk: i64) -> Instance<Author> {
    conn.enqueue(CannedResult::insert(pk));
    let mut author = Instance::<Author>::new();
    author
        .set("name", Value::Text("Frank Herbert".into()), conn)
        .expect("set name");
    author.save(conn).expect("save");
    author
}

#[test]
fn test_assignment_by_pk_checks_existence() {
    let mut conn = ScriptedConnection::new();
    conn.enqueue(CannedResult::rows(&["id"], vec![vec![Value::Int(7)]]));

    let mut book = Instance::<Book>::new();
    book.set("author", Value::Int(7), &mut conn).expect("set");

    let (sql, params) = conn.last_statement().expect("statement").clone();
    assert_eq!(sql, "SELECT id FROM author WHERE id = ?");
    assert_eq!(params, vec![Value::Int(7)]);
    assert_eq!(book.get("author").expect("author"), &Value::Int(7));
}

#[test]
fn test_assignment_by_pk_rejects_missing_row() {
    let mut conn = ScriptedConnection::new();
    conn.enqueue(CannedResult::rows(&["id"], vec![]));

    let mut book = Instance::<Book>::new();
    let err = book.set("author", Value::Int(99), &mut conn).unwrap_err();
    assert_eq!(
        err,
        OrmError::UnresolvedForeignKey {
            model: "Author".into(),
            pk: 99,
        }
    );
    assert_eq!(book.get("author").expect("author"), &Value::Null);
}

#[test]
fn test_assignment_rejects_non_integer() {
    let mut conn = ScriptedConnection::new();
    let mut book = Instance::<Book>::new();
    let err = book
        .set("author", Value::Text("Frank".into()), &mut conn)
        .unwrap_err();
    assert_eq!(
        err,
        OrmError::TypeMismatch {
            expected: "Author".into(),
            got: "TEXT".into(),
        }
    );
}

#[test]
fn test_typed_assignment_checks_model() {
    let mut conn = ScriptedConnection::new();
    let author = saved_author(&mut conn, 3);

    let mut book = Instance::<Book>::new();
    book.set_related("author", &author).expect("set_related");
    // no existence check: the instance is already saved
    assert_eq!(conn.statements(), 1);
    assert_eq!(book.get("author").expect("author"), &Value::Int(3));

    conn.enqueue(CannedResult::insert(11));
    let mut publisher = Instance::<Publisher>::new();
    publisher.save(&mut conn).expect("save");
    let err = book.set_related("author", &publisher).unwrap_err();
    assert_eq!(
        err,
        OrmError::TypeMismatch {
            expected: "Author".into(),
            got: "Publisher".into(),
        }
    );
}

#[test]
fn test_typed_assignment_rejects_unsaved_instance() {
    let unsaved = Instance::<Author>::new();
    let mut book = Instance::<Book>::new();
    let err = book.set_related("author", &unsaved).unwrap_err();
    assert!(matches!(err, OrmError::InvalidField { .. }));
}

#[test]
fn test_related_fetches_target() {
    let mut conn = ScriptedConnection::new();
    let author = saved_author(&mut conn, 3);

    let mut book = Instance::<Book>::new();
    book.set_related("author", &author).expect("set_related");

    conn.enqueue(CannedResult::rows(
        &["id", "name"],
        vec![vec![Value::Int(3), Value::Text("Frank Herbert".into())]],
    ));
    let related: Instance<Author> = book
        .related("author", &mut conn)
        .expect("related")
        .expect("row");
    assert_eq!(related.pk(), Some(3));

    let (sql, params) = conn.last_statement().expect("statement").clone();
    assert!(sql.ends_with("WHERE (author.id = ?)"));
    assert_eq!(params, vec![Value::Int(3)]);
}

#[test]
fn test_related_null_is_none() {
    let mut conn = ScriptedConnection::new();
    let book = Instance::<Book>::new();
    let related: Option<Instance<Author>> =
        book.related("author", &mut conn).expect("related");
    assert!(related.is_none());
    assert_eq!(conn.statements(), 0);
}

#[test]
fn test_reverse_builds_child_queryset() {
    let mut conn = ScriptedConnection::new();
    let author = saved_author(&mut conn, 3);

    let books = author.reverse::<Book>("books").expect("reverse");
    let (sql, params) = books.build_query();
    assert_eq!(
        sql,
        "SELECT DISTINCT book.id, book.title, book.author_id FROM book \
         WHERE (book.author_id = ?)"
    );
    assert_eq!(params, vec![Value::Int(3)]);
}

#[test]
fn test_reverse_checks_child_model() {
    let mut conn = ScriptedConnection::new();
    let author = saved_author(&mut conn, 3);
    let err = author.reverse::<Publisher>("books").unwrap_err();
    assert_eq!(
        err,
        OrmError::TypeMismatch {
            expected: "Book".into(),
            got: "Publisher".into(),
        }
    );
}
