pub mod config;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod refresh;
pub mod report;

pub use error::FetchError;
pub use parse::{Field, HeaderMapping, Registrant};
pub use refresh::{FetchStatus, RefreshController, Snapshot};
