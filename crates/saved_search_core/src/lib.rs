pub mod domain;
pub mod error;
pub mod ports;
pub mod row;

pub use domain::{NewSavedSearch, SavedSearch, SavedSearchScope, SavedSearchUpdate, SAVED_SEARCHES_TABLE};
pub use error::{RecordError, RecordResult};
pub use ports::{PortError, PortResult, SavedSearchRepository};
pub use row::{columns, Row, Value};
