use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use hackbot_core::Config;
use serenity::model::id::{ChannelId, UserId};
use tokio::sync::{Notify, RwLock};

use crate::platform::GuildApi;
use crate::reactions::RoutingTable;
use crate::reconcile::ProjectRegistry;

/// Shared application state
///
/// The registry and routing table are only ever replaced wholesale, so a
/// reader always sees one complete pass.
pub struct AppState {
    pub api: Arc<dyn GuildApi>,
    pub config: Config,
    pub roles_channel: ChannelId,
    bot_user: OnceLock<UserId>,
    registry: RwLock<Arc<ProjectRegistry>>,
    routing: RwLock<Arc<RoutingTable>>,
    announce_pending: AtomicBool,
    shutdown: Notify,
}

impl AppState {
    pub fn new(api: Arc<dyn GuildApi>, config: Config, roles_channel: ChannelId) -> Self {
        Self {
            api,
            config,
            roles_channel,
            bot_user: OnceLock::new(),
            registry: RwLock::new(Arc::new(ProjectRegistry::default())),
            routing: RwLock::new(Arc::new(RoutingTable::default())),
            announce_pending: AtomicBool::new(false),
            shutdown: Notify::new(),
        }
    }

    pub fn bot_user(&self) -> Option<UserId> {
        self.bot_user.get().copied()
    }

    /// Record the bot's own user id. Only the first call has an effect.
    pub fn set_bot_user(&self, user: UserId) {
        let _ = self.bot_user.set(user);
    }

    pub async fn registry(&self) -> Arc<ProjectRegistry> {
        self.registry.read().await.clone()
    }

    pub async fn replace_registry(&self, registry: ProjectRegistry) {
        *self.registry.write().await = Arc::new(registry);
    }

    pub async fn routing(&self) -> Arc<RoutingTable> {
        self.routing.read().await.clone()
    }

    pub async fn replace_routing(&self, routing: RoutingTable) {
        *self.routing.write().await = Arc::new(routing);
    }

    pub fn announce_pending(&self) -> bool {
        self.announce_pending.load(Ordering::SeqCst)
    }

    pub fn set_announce_pending(&self, pending: bool) {
        self.announce_pending.store(pending, Ordering::SeqCst);
    }

    /// Ask the process to disconnect and exit.
    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    pub async fn shutdown_requested(&self) {
        self.shutdown.notified().await;
    }
}
