pub mod ollama;
pub mod session;

pub use ollama::OllamaProvider;
pub use session::{ChatSession, SessionProvider};
