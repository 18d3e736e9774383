//! Application assembly: settings, event bus, repository and gate wired into
//! the module registry.

use std::sync::Arc;

use axum::Router;
use folio_authz::{AuthorizationGate, SessionTokenGate};
use folio_events::EventBus;
use folio_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;
use crate::modules::albums::repository::{AlbumRepository, MemoryAlbumRepository};
use crate::modules::albums::service::AlbumService;
use crate::modules::albums::snapshot::ClientMeta;

pub struct App {
    settings: Settings,
    events: EventBus,
    registry: ModuleRegistry,
}

impl App {
    /// Assemble the application with the in-memory album store.
    pub fn new(settings: Settings) -> Self {
        Self::with_repository(settings, Arc::new(MemoryAlbumRepository::new()))
    }

    /// Assemble the application on top of an existing album store.
    pub fn with_repository(settings: Settings, repo: Arc<dyn AlbumRepository>) -> Self {
        let gate = Arc::new(SessionTokenGate::from_settings(&settings.auth));
        Self::with_parts(settings, repo, gate)
    }

    pub fn with_parts(
        settings: Settings,
        repo: Arc<dyn AlbumRepository>,
        gate: Arc<dyn AuthorizationGate>,
    ) -> Self {
        let events = EventBus::new(settings.events.capacity);
        let client = ClientMeta::new(settings.environment.clone(), settings.auth.public);
        let service = Arc::new(AlbumService::new(
            repo,
            events.clone(),
            settings.albums.clone(),
            client,
        ));

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, service, gate);

        Self {
            settings,
            events,
            registry,
        }
    }

    /// The bus every module publishes to. Subscribe here to observe events.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Full HTTP router, without binding a socket.
    pub fn router(&self) -> Router {
        folio_http::build_router(&self.registry, &self.settings, &self.events)
    }

    /// Initialize and start every module, serve until shutdown, then stop.
    pub async fn run(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
            events: &self.events,
        };

        self.registry.init_all(&ctx).await?;
        self.registry.start_all(&ctx).await?;

        let served = folio_http::start_server(&self.registry, &self.settings, &self.events).await;

        self.registry.stop_all().await?;
        tracing::info!("folio-app shutdown complete");
        served
    }
}
