pub mod http;
pub mod prompt;
pub mod provider;
pub mod providers;

pub use http::build_http_client;
pub use prompt::{PromptBuilder, PromptTemplate};
pub use provider::{AIProvider, ClientKind, ProviderFactory, ProviderSettings};
