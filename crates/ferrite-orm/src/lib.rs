//! A small object-relational mapper: declared schemas, validated fields,
//! dirty-tracked instances, and lazy composable query sets.
//!
//! A model is a unit struct with a memoized [`ModelSchema`]:
//!
//! ```ignore
//! struct Book;
//!
//! impl Model for Book {
//!     fn schema() -> &'static ModelSchema {
//!         static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             ModelSchema::builder("Book")
//!                 .field("id", PrimaryKeyField::new())
//!                 .field("title", CharField::new(64))
//!                 .field("author", ForeignKeyField::new(Author::schema))
//!                 .build()
//!                 .expect("book schema")
//!         })
//!     }
//! }
//! ```
//!
//! Queries chain off [`Model::objects`] and stay lazy until executed:
//!
//! ```ignore
//! let mut recent = Book::objects()
//!     .filter([("author__name__startswith", "J")])?
//!     .exclude([("year__lt", 1990)])?
//!     .order_by(&["-year"])?;
//! recent.execute(&mut conn)?;
//! for book in recent {
//!     println!("{}", book?);
//! }
//! ```

pub mod error;
pub mod fields;
pub mod manager;
pub mod model;
pub mod query;
pub mod queryset;
pub mod schema;

pub use error::{OrmError, Result, UsageError};
pub use fields::{
    CharField, DateTimeField, FieldKind, FieldOptions, ForeignKeyField, HasOneField, JsonField,
    ManyToManyField, NumberField, PrimaryKeyField, ReverseField, TextField,
};
pub use manager::Manager;
pub use model::{Instance, Model};
pub use queryset::{IntoLookups, QuerySet};
pub use schema::{FieldDef, ModelSchema, SchemaBuilder, SchemaRef};

pub use ferrite_core::{Connection, StorageError, ToValue, Value};
