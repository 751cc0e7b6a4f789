//! Telegram bot client wrapper.

use std::sync::Arc;
use std::time::Duration;

use grammers_client::update::{Message, Update};
use grammers_client::{Client, InvocationError, SenderPool, SignInError, UpdatesConfiguration, sender};
use grammers_session::storages::SqliteSession;
use grammers_session::types::PeerKind;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::commands::MessageHandler;
use crate::config::TelegramConfig;

type RawUpdates = UnboundedReceiver<grammers_client::sender::UpdatesLike>;

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Bot sign in failed: {0}")]
    SignInFailed(String),

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Updates stream already consumed")]
    UpdatesTaken,

    #[error("API invocation error: {0}")]
    Invocation(String),
}

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        let err_str = err.to_string();

        if (err_str.contains("FLOOD_WAIT") || err_str.contains("flood"))
            && let Some(seconds) = extract_flood_wait_seconds(&err_str)
        {
            return Self::FloodWait(seconds);
        }

        Self::Invocation(err_str)
    }
}

/// Extracts flood wait seconds from an error message.
fn extract_flood_wait_seconds(err_msg: &str) -> Option<u32> {
    let patterns = ["FLOOD_WAIT_", "flood wait "];

    for pattern in patterns {
        if let Some(idx) = err_msg.to_lowercase().find(&pattern.to_lowercase()) {
            let start = idx + pattern.len();
            let num_str: String = err_msg[start..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(seconds) = num_str.parse() {
                return Some(seconds);
            }
        }
    }
    None
}

/// High-level Telegram bot wrapper.
pub struct TelegramBot {
    /// The underlying grammers client.
    client: Client,

    /// Handle to the sender pool for disconnection.
    handle: sender::SenderPoolHandle,

    /// Raw updates, taken once by [`TelegramBot::run`].
    updates: Mutex<Option<RawUpdates>>,

    /// Background task running the sender pool.
    _pool_task: JoinHandle<()>,
}

impl TelegramBot {
    /// Connects to Telegram with the given configuration.
    pub async fn connect(config: &TelegramConfig) -> Result<Self, TelegramError> {
        info!("Connecting to Telegram...");

        let session = Arc::new(
            SqliteSession::open(&config.session_path)
                .await
                .map_err(|e| TelegramError::Session(e.to_string()))?,
        );

        let SenderPool {
            runner,
            updates,
            handle,
        } = SenderPool::new(Arc::clone(&session), config.api_id);

        let client = Client::new(handle.clone());

        let pool_task = tokio::spawn(async move {
            runner.run().await;
        });

        Ok(Self {
            client,
            handle: handle.thin,
            updates: Mutex::new(Some(updates)),
            _pool_task: pool_task,
        })
    }

    /// Checks if the session is already signed in.
    pub async fn is_authorized(&self) -> Result<bool, TelegramError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))
    }

    /// Signs in with a bot token unless the stored session is already authorized.
    pub async fn ensure_signed_in(&self, config: &TelegramConfig) -> Result<(), TelegramError> {
        if self.is_authorized().await? {
            info!("Telegram session already authorized");
            return Ok(());
        }

        info!("Signing in as bot...");
        match self
            .client
            .bot_sign_in(&config.bot_token, &config.api_hash)
            .await
        {
            Ok(_user) => {
                info!("Bot signed in");
                Ok(())
            }
            Err(SignInError::Other(e)) => Err(e.into()),
            Err(e) => Err(TelegramError::SignInFailed(e.to_string())),
        }
    }

    /// Answers private text messages until the update stream fails.
    pub async fn run(&self, handler: &MessageHandler) -> Result<(), TelegramError> {
        let updates = self
            .updates
            .lock()
            .await
            .take()
            .ok_or(TelegramError::UpdatesTaken)?;

        let mut stream = self
            .client
            .stream_updates(
                updates,
                UpdatesConfiguration {
                    catch_up: false,
                    ..Default::default()
                },
            )
            .await;

        info!("Listening for messages");

        loop {
            let update = stream.next().await?;

            let Update::NewMessage(message) = update else {
                continue;
            };

            if message.outgoing() || !is_private(&message) {
                continue;
            }

            let text = message.text();
            if text.trim().is_empty() {
                continue;
            }

            let reply = handler.handle(text);
            if let Err(e) = self.reply(&message, &reply).await {
                error!("Failed to send reply: {}", e);
            }
        }
    }

    /// Sends `text` back to the chat `message` came from, retrying once after a flood wait.
    async fn reply(&self, message: &Message, text: &str) -> Result<(), TelegramError> {
        match message.reply(text).await {
            Ok(_) => Ok(()),
            Err(e) => match TelegramError::from(e) {
                TelegramError::FloodWait(seconds) => {
                    warn!("Flood wait triggered: {} seconds", seconds);
                    tokio::time::sleep(Duration::from_secs(u64::from(seconds))).await;
                    debug!("Retrying reply after flood wait");
                    message.reply(text).await.map(|_| ()).map_err(Into::into)
                }
                other => Err(other),
            },
        }
    }

    /// Disconnects from Telegram.
    pub fn disconnect(&self) {
        info!("Disconnecting from Telegram...");
        self.handle.quit();
    }
}

fn is_private(message: &Message) -> bool {
    matches!(message.peer_id().kind(), PeerKind::User | PeerKind::UserSelf)
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot").finish_non_exhaustive()
    }
}
