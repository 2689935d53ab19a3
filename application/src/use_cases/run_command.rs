//! Run Command use case
//!
//! Maps the fixed admin-command vocabulary to registry mutations and
//! history clearing. Every command produces exactly one user-visible
//! reply; bad arguments become usage text, never errors.

use crate::ports::history::ConversationStore;
use crate::ports::transport::{Transport, TransportError};
use crate::use_cases::lock_registry;
use chorus_domain::{Command, PersonaId, PersonaRegistry, TurnPrompt};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Use case for processing one admin command
pub struct RunCommandUseCase {
    registry: Arc<Mutex<PersonaRegistry>>,
    store: Arc<dyn ConversationStore>,
    transport: Arc<dyn Transport>,
}

impl RunCommandUseCase {
    pub fn new(
        registry: Arc<Mutex<PersonaRegistry>>,
        store: Arc<dyn ConversationStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            registry,
            store,
            transport,
        }
    }

    /// Execute a command-shaped message and deliver the reply
    pub async fn execute(
        &self,
        text: &str,
        author_id: &str,
        channel_id: &str,
    ) -> Result<(), TransportError> {
        let reply = match Command::parse(text) {
            Err(usage) => usage.to_string(),
            Ok(command) => self.run(command, author_id, channel_id).await,
        };
        self.transport.send_system(channel_id, &reply).await
    }

    async fn run(&self, command: Command, author_id: &str, channel_id: &str) -> String {
        match command {
            Command::Remove(name) => {
                self.mutate(&name, |registry, persona| registry.deactivate(persona));
                format!("**Removed {name} from active personas.**")
            }
            Command::Add(name) => {
                self.mutate(&name, |registry, persona| registry.activate(persona));
                format!("**Added {name} to active personas.**")
            }
            Command::Isolate(name) => {
                self.mutate(&name, |registry, persona| registry.isolate(persona));
                format!("**Isolation mode: only {name} will respond.**")
            }
            Command::Reset => {
                lock_registry(&self.registry).reset_all();
                "**All personas reset to active. Isolation mode off.**".to_string()
            }
            Command::New => {
                self.store.clear(channel_id).await;
                lock_registry(&self.registry).reset_all();
                "**Memory cleared and all personas reset.**".to_string()
            }
            Command::Commands => TurnPrompt::help_text().to_string(),
            Command::Private => match self.transport.create_private_channel(author_id).await {
                Ok(private_id) => format!("**Private channel created:** <#{private_id}>"),
                Err(e) => {
                    warn!("private channel creation failed: {e}");
                    "**Could not create a private channel right now.**".to_string()
                }
            },
            Command::Unknown(word) => format!(
                "**Unknown command: {word}.**\n**Use !commands to see available commands.**"
            ),
        }
    }

    /// Apply a registry mutation for a named persona.
    ///
    /// Unknown names are silently ignored, mirroring the registry's no-op
    /// semantics.
    fn mutate(&self, name: &str, apply: impl FnOnce(&mut PersonaRegistry, PersonaId)) {
        match name.parse::<PersonaId>() {
            Ok(persona) => apply(&mut lock_registry(&self.registry), persona),
            Err(_) => debug!("ignoring command for unknown persona {name:?}"),
        }
    }
}
