pub mod error;
pub mod logging;

pub use error::{Result, ReviewError};
pub use logging::{setup_logging, LogFormat, LoggingConfig};
