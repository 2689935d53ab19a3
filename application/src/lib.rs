//! Application layer for persona-chorus
//!
//! Use cases drive the domain against abstract ports. Adapters for the
//! ports live in the infrastructure layer and are injected by the binary.

pub mod ports;
pub mod use_cases;

pub use ports::{
    classifier::PersonaClassifier,
    crisis::CrisisDetector,
    gateway::{GatewayError, PersonaGateway},
    history::ConversationStore,
    random::RandomSource,
    transport::{IndicatorHandle, Transport, TransportError},
};
pub use use_cases::{
    handle_message::{HandleMessageError, HandleMessageUseCase, OrchestratorSettings},
    run_command::RunCommandUseCase,
};
