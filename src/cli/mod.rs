pub mod args;

pub use args::{Args, Command, OutputFormat, ReviewArgs, ServeArgs};
