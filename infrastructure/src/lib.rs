//! Infrastructure layer for persona-chorus
//!
//! Adapters for the application ports: the HTTP model gateway, the
//! LLM-backed classifier, the keyword crisis detector, in-memory history,
//! the console transport, configuration loading, and the live random
//! source.

pub mod classifier;
pub mod config;
pub mod crisis;
pub mod gateway;
pub mod history;
pub mod random;
pub mod transport;

pub use classifier::GatewayClassifier;
pub use config::{ConfigLoader, FileConfig};
pub use crisis::KeywordCrisisDetector;
pub use gateway::ChatCompletionsGateway;
pub use history::InMemoryConversationStore;
pub use random::ThreadRngSource;
pub use transport::ConsoleTransport;
