use thiserror::Error;
use tracing::info;

use crate::config::ParticipantReference;
use crate::platform::{ChatHandle, ChatPlatform};

/// A chat taking part in the relay, either as a source or a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub handle: ChatHandle,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Could not find chat with id={handle}: {source}")]
    ChatNotFound {
        handle: ChatHandle,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Could not find chat for username '{username}': {source}")]
    UsernameNotFound {
        username: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Look a configured participant up in the platform's chat directory.
///
/// `role` only feeds the log line ("source", "destination").
pub async fn resolve(
    platform: &dyn ChatPlatform,
    role: &str,
    reference: &ParticipantReference,
) -> Result<Participant, ResolutionError> {
    match reference {
        ParticipantReference::ByHandle { chat_id } => {
            let chat = platform
                .resolve_chat_by_handle(*chat_id)
                .await
                .map_err(|e| ResolutionError::ChatNotFound {
                    handle: *chat_id,
                    source: e.into(),
                })?;
            info!(
                "Resolved {} participant with chatId={} to a chat with title='{}'",
                role, chat_id, chat.title
            );
            Ok(Participant {
                handle: *chat_id,
                name: chat.title,
            })
        }
        ParticipantReference::ByUsername { username } => {
            let name = username.trim_start_matches('@');
            let chat = platform
                .resolve_chat_by_username(name)
                .await
                .map_err(|e| ResolutionError::UsernameNotFound {
                    username: name.to_string(),
                    source: e.into(),
                })?;
            info!(
                "Resolved {} participant with name='{}' to a chat with title='{}', chatId={}",
                role, name, chat.title, chat.handle
            );
            Ok(Participant {
                handle: chat.handle,
                name: chat.title,
            })
        }
    }
}
