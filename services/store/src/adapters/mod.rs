pub mod db;
pub mod memory;

pub use db::PgSavedSearchAdapter;
pub use memory::InMemorySavedSearchAdapter;
