//! quick-seed: seed relational databases with relationally consistent fake data.
//!
//! A [`schema::Schema`] declares tables, record counts and per-field rules.
//! The [`seeder::Seeder`] orders tables so referenced tables come first,
//! generates records, inserts them through a [`adapter::StorageAdapter`] and
//! resolves foreign keys against the rows inserted so far.
//!
//! ```ignore
//! use quick_seed::adapter::{ConnectionConfig, MemoryAdapter};
//! use quick_seed::schema::{FieldSpec, Schema, TableSpec};
//! use quick_seed::seeder::Seeder;
//!
//! let schema = Schema::from_tables([
//!     TableSpec::new("users", 10).with_field("name", FieldSpec::literal("person.fullName")),
//!     TableSpec::new("posts", 50).with_field("author_id", FieldSpec::reference("users", "id")),
//! ])?;
//!
//! let mut seeder = Seeder::new(MemoryAdapter::new());
//! let summary = seeder.seed(&schema, &ConnectionConfig::in_memory())?;
//! println!("{}", summary);
//! ```

pub mod adapter;
pub mod cmd;
pub mod config;
pub mod error;
pub mod faker;
pub mod generator;
pub mod json_schema;
pub mod progress;
pub mod schema;
pub mod seeder;
pub mod store;

pub use error::SeedError;
