pub mod error;

pub use error::{DbError, DriverError, Result};
