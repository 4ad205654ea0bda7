use std::sync::Arc;

use pfy_config::PfyConfig;
use pfy_db::service::PfyService;
use pfy_notify::{Dispatcher, RoomHub, push::DEFAULT_ROOM_CAPACITY};

/// Shared handles for every request and socket.
///
/// The database and the room table are the only shared mutable state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PfyService>,
    pub hub: Arc<RoomHub>,
    pub dispatcher: Dispatcher,
    pub config: Arc<PfyConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(service: Arc<PfyService>, config: PfyConfig) -> Self {
        let hub = RoomHub::new(DEFAULT_ROOM_CAPACITY);
        let dispatcher = Dispatcher::new(
            Arc::clone(&service),
            hub.clone(),
            config.dispatch.recipient_timeout(),
        );
        Self {
            service,
            hub,
            dispatcher,
            config: Arc::new(config),
        }
    }

    pub(crate) fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}
