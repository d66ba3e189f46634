pub mod parser;
pub mod request;
pub mod service;

pub use parser::{extract_fixed_code, extract_sections, ParsedReview, Sections};
pub use request::{Origin, ReviewRequest};
pub use service::{ModelResponse, ReviewOutcome, ReviewService};
