//! # Sotto Client
//!
//! High-level coordinator for the sotto ingestion pipeline: wires stores,
//! the decryption gateway, the pipeline, and the transport listener into a
//! running client.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sotto_client::{Client, ClientConfig};
//!
//! let client = Client::builder(ClientConfig::default())
//!     .gateway(my_gateway)
//!     .start()?;
//!
//! // Feed the connection from a socket driver
//! let connection = client.connection();
//!
//! // Observe processed messages
//! let mut events = client.events();
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

pub mod config;
pub mod error;

pub use config::ClientConfig;
pub use error::ClientError;

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use sotto_core::{Clock, DecryptionGateway, SystemClock};
use sotto_pipeline::{
    BadgeIndicator, ClientEvent, DeliveryReceiptCorrelator, DecryptionPipeline,
    MessageReceivedHandler, MessageRouter, NoopBadge, Notifier, UnreadTracker,
};
use sotto_store::{
    ConversationStore, CounterStore, InMemoryConversationStore, InMemoryCounterStore,
    InMemoryMessageStore, MessageStore, StorageError,
};
use sotto_transport::{channel, ConnectionHandle, EnvelopeCodec, PostcardCodec, SignalListener};

/// Whether the account has completed registration
///
/// The listener only starts on a registered account; until then inbound
/// pushes have nothing to decrypt against.
pub trait RegistrationStatus: Send + Sync {
    /// True once registration is done
    fn is_done(&self) -> bool;
}

/// Registration state of an account that is already set up
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRegistered;

impl RegistrationStatus for AlwaysRegistered {
    fn is_done(&self) -> bool {
        true
    }
}

/// Builder for a [`Client`]
///
/// Stores, badge, clock, codec, and registration default to in-memory and
/// no-op implementations; the gateway has no default.
pub struct ClientBuilder {
    config: ClientConfig,
    gateway: Option<Arc<dyn DecryptionGateway>>,
    codec: Arc<dyn EnvelopeCodec>,
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    counters: Arc<dyn CounterStore>,
    badge: Arc<dyn BadgeIndicator>,
    clock: Arc<dyn Clock>,
    registration: Arc<dyn RegistrationStatus>,
}

impl ClientBuilder {
    /// Start a builder from a configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            gateway: None,
            codec: Arc::new(PostcardCodec),
            conversations: Arc::new(InMemoryConversationStore::new()),
            messages: Arc::new(InMemoryMessageStore::new()),
            counters: Arc::new(InMemoryCounterStore::new()),
            badge: Arc::new(NoopBadge),
            clock: Arc::new(SystemClock),
            registration: Arc::new(AlwaysRegistered),
        }
    }

    /// Set the decryption gateway (required)
    pub fn gateway(mut self, gateway: Arc<dyn DecryptionGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set the envelope codec
    pub fn codec(mut self, codec: Arc<dyn EnvelopeCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Set the conversation store
    pub fn conversations(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.conversations = store;
        self
    }

    /// Set the message store
    pub fn messages(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.messages = store;
        self
    }

    /// Set the counter store
    pub fn counters(mut self, store: Arc<dyn CounterStore>) -> Self {
        self.counters = store;
        self
    }

    /// Set the badge indicator
    pub fn badge(mut self, badge: Arc<dyn BadgeIndicator>) -> Self {
        self.badge = badge;
        self
    }

    /// Set the clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the registration status source
    pub fn registration(mut self, registration: Arc<dyn RegistrationStatus>) -> Self {
        self.registration = registration;
        self
    }

    /// Wire everything together and spawn the listener
    pub fn start(self) -> Result<Client, ClientError> {
        if !self.registration.is_done() {
            return Err(ClientError::NotRegistered);
        }
        let gateway = self
            .gateway
            .ok_or(ClientError::MissingCollaborator("decryption gateway"))?;

        let notifier = Notifier::new(self.config.event_capacity);
        let unread = Arc::new(UnreadTracker::new(self.counters, self.badge));

        let decryption = Arc::new(
            DecryptionPipeline::new(
                gateway.clone(),
                self.conversations.clone(),
                self.messages.clone(),
                notifier.clone(),
                self.clock.clone(),
            )
            .with_default_group_name(self.config.default_group_name.clone()),
        );
        let received = MessageReceivedHandler::new(
            self.conversations.clone(),
            self.messages.clone(),
            unread.clone(),
            decryption,
            self.clock.clone(),
        );
        let receipts =
            DeliveryReceiptCorrelator::new(self.conversations.clone(), self.messages.clone());
        let router = Arc::new(MessageRouter::new(received, receipts));

        let listener = SignalListener::new(gateway, self.codec, router, notifier.clone());
        let (connection, requests) = channel(self.config.request_capacity);
        let listener_task = listener.spawn(requests);

        info!("Client started");
        Ok(Client {
            connection,
            notifier,
            unread,
            listener_task,
        })
    }
}

/// A running client
///
/// Dropping every [`ConnectionHandle`] (including this client's) closes
/// the feed and winds the listener down.
pub struct Client {
    connection: ConnectionHandle,
    notifier: Notifier,
    unread: Arc<UnreadTracker>,
    listener_task: JoinHandle<()>,
}

impl Client {
    /// Start building a client
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Handle the connection driver pushes requests through
    pub fn connection(&self) -> ConnectionHandle {
        self.connection.clone()
    }

    /// Subscribe to processed-message and transport-error events
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.notifier.subscribe()
    }

    /// Current unread count
    pub async fn unread_count(&self) -> Result<u64, StorageError> {
        self.unread.current().await
    }

    /// Handle of the listener task, for supervision
    pub fn listener_task(&self) -> &JoinHandle<()> {
        &self.listener_task
    }
}

/// Install a global `tracing` subscriber honoring `RUST_LOG`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
