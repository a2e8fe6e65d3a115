//! `ScribbleServer` builder and accept loop.
//!
//! Ties the layers together: the WebSocket transport hands over
//! connections, the handler decodes client events, and the room registry
//! does the game work.

use std::sync::Arc;
use std::time::Duration;

use scribble_protocol::{Codec, JsonCodec};
use scribble_room::{GameConfig, RoomRegistry};
use scribble_transport::{Transport, WebSocketTransport};
use scribble_words::WordList;

use crate::ScribbleError;
use crate::handler::handle_connection;

/// How long a connection may stay silent before it is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Server-wide settings fixed at build time.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub idle_timeout: Duration,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            game: GameConfig::default(),
        }
    }
}

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: RoomRegistry,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Scribble server.
///
/// # Example
///
/// ```rust,no_run
/// use scribble::prelude::*;
///
/// # async fn run() -> Result<(), ScribbleError> {
/// let server = ScribbleServer::builder()
///     .bind("0.0.0.0:5000")
///     .words(WordList::builtin())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ScribbleServerBuilder {
    config: ServerConfig,
    words: Option<WordList>,
}

impl ScribbleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            words: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the game tunables shared by every room.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.config.game = config;
        self
    }

    /// Sets the word list. Defaults to the built-in list.
    pub fn words(mut self, words: WordList) -> Self {
        self.words = Some(words);
        self
    }

    /// Sets how long a silent connection is kept open.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<ScribbleServer<JsonCodec>, ScribbleError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let words = self.words.unwrap_or_else(WordList::builtin);
        if words.is_empty() {
            tracing::warn!("word list is empty; games will not start");
        }

        let state = Arc::new(ServerState {
            registry: RoomRegistry::new(self.config.game.clone(), Arc::new(words)),
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(ScribbleServer {
            transport,
            state,
            config: self.config,
        })
    }
}

impl Default for ScribbleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Scribble server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ScribbleServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    config: ServerConfig,
}

impl ScribbleServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ScribbleServerBuilder {
        ScribbleServerBuilder::new()
    }
}

impl<C> ScribbleServer<C>
where
    C: Codec + Clone + Send + Sync + 'static,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The settings this server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task per connection. A failed accept (for example
    /// a client that never completes the upgrade) is logged and skipped.
    /// Runs until the task is dropped.
    pub async fn run(mut self) -> Result<(), ScribbleError> {
        tracing::info!(
            addr = %self.config.bind_addr,
            round_seconds = self.config.game.round_seconds,
            max_players = self.config.game.max_players,
            "scribble server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
