use std::sync::Arc;

use folio_authz::Caller;
use folio_events::{EventBus, CONFIG_UPDATED};
use folio_kernel::settings::AlbumSettings;

use super::error::AlbumError;
use super::models::{Album, AlbumId, AlbumSearchForm};
use super::query::AlbumQuery;
use super::repository::AlbumRepository;
use super::snapshot::{ClientConfig, ClientCounts, ClientMeta};

/// One page of search results with the bounds that were applied.
#[derive(Debug, Clone)]
pub struct AlbumPage {
    pub albums: Vec<Album>,
    pub count: usize,
    pub offset: usize,
}

/// Album use cases: search, create, rename and favorite toggling.
///
/// Mutations require a [`Caller`], commit through the repository and only
/// then publish their events. Rename and favorite toggling load and save
/// without a lock in between, so concurrent writers to one album race and
/// the last save wins.
pub struct AlbumService {
    repo: Arc<dyn AlbumRepository>,
    events: EventBus,
    settings: AlbumSettings,
    client: ClientMeta,
}

impl AlbumService {
    pub fn new(
        repo: Arc<dyn AlbumRepository>,
        events: EventBus,
        settings: AlbumSettings,
        client: ClientMeta,
    ) -> Self {
        Self {
            repo,
            events,
            settings,
            client,
        }
    }

    pub async fn list(&self, form: &AlbumSearchForm) -> Result<AlbumPage, AlbumError> {
        let query = AlbumQuery::from_form(form, &self.settings);
        let albums = self.repo.find_matching(&query).await?;

        tracing::debug!(
            count = query.count,
            offset = query.offset,
            returned = albums.len(),
            "album search"
        );

        Ok(AlbumPage {
            albums,
            count: query.count,
            offset: query.offset,
        })
    }

    pub async fn create(&self, caller: &Caller, name: &str) -> Result<Album, AlbumError> {
        let name = validate_name(name)?;

        let album = match self.repo.create(Album::new(name)).await {
            Ok(album) => album,
            Err(err) => return Err(log_conflict(AlbumError::from(err))),
        };

        tracing::info!(
            album_id = %album.id,
            caller = caller.subject(),
            "album created"
        );
        self.events.success(format!("Album {} created", album.name));

        Ok(album)
    }

    pub async fn rename(
        &self,
        caller: &Caller,
        id: AlbumId,
        name: &str,
    ) -> Result<Album, AlbumError> {
        let name = validate_name(name)?;
        let mut album = self.load(id).await?;

        album.rename(name);
        let album = match self.repo.save(album).await {
            Ok(album) => album,
            Err(err) => return Err(log_conflict(AlbumError::from(err))),
        };

        tracing::info!(
            album_id = %album.id,
            caller = caller.subject(),
            "album renamed"
        );
        self.publish_config_updated().await;
        self.events.success(format!("Album {} updated", album.name));

        Ok(album)
    }

    pub async fn like(&self, caller: &Caller, id: AlbumId) -> Result<(), AlbumError> {
        self.set_favorite(caller, id, true).await
    }

    pub async fn dislike(&self, caller: &Caller, id: AlbumId) -> Result<(), AlbumError> {
        self.set_favorite(caller, id, false).await
    }

    async fn set_favorite(
        &self,
        caller: &Caller,
        id: AlbumId,
        favorite: bool,
    ) -> Result<(), AlbumError> {
        let mut album = self.load(id).await?;

        album.favorite = favorite;
        self.repo.save(album).await?;

        tracing::info!(
            album_id = %id,
            favorite,
            caller = caller.subject(),
            "album favorite updated"
        );
        self.publish_config_updated().await;

        Ok(())
    }

    /// Current client-visible configuration.
    pub async fn client_config(&self) -> Result<ClientConfig, AlbumError> {
        let favorites = AlbumQuery::favorites(self.settings.max_count);
        let everything = AlbumQuery {
            favorites_only: false,
            ..favorites.clone()
        };

        let albums = self.repo.find_matching(&favorites).await?;
        let count = ClientCounts {
            albums: self.repo.count(&everything).await?,
            favorites: self.repo.count(&favorites).await?,
        };

        Ok(ClientConfig {
            meta: self.client.clone(),
            albums,
            count,
        })
    }

    async fn load(&self, id: AlbumId) -> Result<Album, AlbumError> {
        match self.repo.find(id).await? {
            Some(album) => Ok(album),
            None => {
                tracing::debug!(album_id = %id, "album not found");
                Err(AlbumError::NotFound)
            }
        }
    }

    /// The store already committed; a snapshot failure only costs clients
    /// one refresh.
    async fn publish_config_updated(&self) {
        match self.client_config().await {
            Ok(config) => {
                self.events.publish(CONFIG_UPDATED, &config);
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to build client config snapshot");
            }
        }
    }
}

fn log_conflict(err: AlbumError) -> AlbumError {
    if let AlbumError::Conflict { name } = &err {
        tracing::error!(album_name = %name, "album name already exists");
    }
    err
}

fn validate_name(name: &str) -> Result<&str, AlbumError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AlbumError::Validation(
            "album name must not be empty".to_string(),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::albums::repository::MemoryAlbumRepository;
    use axum::http::HeaderMap;
    use folio_authz::{AuthorizationGate, SessionTokenGate};
    use folio_events::{AppEvent, NOTIFY_SUCCESS};
    use folio_kernel::settings::Environment;
    use tokio::sync::broadcast::{error::TryRecvError, Receiver};

    struct Fixture {
        repo: Arc<MemoryAlbumRepository>,
        service: AlbumService,
        events: Receiver<AppEvent>,
        caller: Caller,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MemoryAlbumRepository::new());
        let bus = EventBus::new(16);
        let events = bus.subscribe();
        let service = AlbumService::new(
            repo.clone(),
            bus,
            AlbumSettings::default(),
            ClientMeta::new(Environment::Local, false),
        );
        let caller = SessionTokenGate::new(true, Vec::new())
            .authorize(&HeaderMap::new())
            .unwrap();

        Fixture {
            repo,
            service,
            events,
            caller,
        }
    }

    fn drain(rx: &mut Receiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn create_trims_name_and_notifies() {
        let mut f = fixture();

        let album = f.service.create(&f.caller, "  Trip ").await.unwrap();

        assert_eq!(album.name, "Trip");
        assert!(!album.favorite);
        let events = drain(&mut f.events);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].topic, NOTIFY_SUCCESS);
        assert_eq!(events[0].data["message"], "Album Trip created");
    }

    #[tokio::test]
    async fn create_rejects_blank_name_without_writing() {
        let mut f = fixture();

        let err = f.service.create(&f.caller, "   ").await.unwrap_err();

        assert!(matches!(err, AlbumError::Validation(_)));
        assert_eq!(f.repo.write_count(), 0);
        assert_eq!(f.events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_and_keeps_original() {
        let mut f = fixture();
        let original = f.service.create(&f.caller, "Trip").await.unwrap();
        drain(&mut f.events);

        let err = f.service.create(&f.caller, "Trip").await.unwrap_err();

        assert!(matches!(err, AlbumError::Conflict { ref name } if name == "Trip"));
        assert_eq!(f.repo.len().await, 1);
        assert_eq!(f.repo.find(original.id).await.unwrap().unwrap(), original);
        assert!(drain(&mut f.events).is_empty());
    }

    #[tokio::test]
    async fn rename_publishes_snapshot_then_success() {
        let mut f = fixture();
        let album = f.service.create(&f.caller, "Trip").await.unwrap();
        drain(&mut f.events);

        let renamed = f.service.rename(&f.caller, album.id, "Trip2").await.unwrap();

        assert_eq!(renamed.id, album.id);
        assert_eq!(renamed.name, "Trip2");
        assert_eq!(renamed.slug, "trip2");

        let events = drain(&mut f.events);
        let topics: Vec<_> = events.iter().map(|e| e.topic.as_str()).collect();
        assert_eq!(topics, vec![CONFIG_UPDATED, NOTIFY_SUCCESS]);
        assert_eq!(events[0].data["count"]["albums"], 1);
        assert_eq!(events[1].data["message"], "Album Trip2 updated");
    }

    #[tokio::test]
    async fn rename_unknown_album_writes_nothing() {
        let mut f = fixture();
        f.service.create(&f.caller, "Trip").await.unwrap();
        drain(&mut f.events);
        let writes = f.repo.write_count();

        let err = f
            .service
            .rename(&f.caller, AlbumId::generate(), "Other")
            .await
            .unwrap_err();

        assert!(matches!(err, AlbumError::NotFound));
        assert_eq!(f.repo.write_count(), writes);
        assert!(drain(&mut f.events).is_empty());
    }

    #[tokio::test]
    async fn rename_to_existing_name_conflicts() {
        let f = fixture();
        f.service.create(&f.caller, "Trip").await.unwrap();
        let home = f.service.create(&f.caller, "Home").await.unwrap();

        let err = f.service.rename(&f.caller, home.id, "Trip").await.unwrap_err();

        assert!(matches!(err, AlbumError::Conflict { .. }));
        assert_eq!(f.repo.find(home.id).await.unwrap().unwrap().name, "Home");
    }

    #[tokio::test]
    async fn like_and_dislike_are_idempotent() {
        let mut f = fixture();
        let album = f.service.create(&f.caller, "Trip").await.unwrap();
        drain(&mut f.events);

        f.service.like(&f.caller, album.id).await.unwrap();
        let once = f.repo.find(album.id).await.unwrap().unwrap();
        f.service.like(&f.caller, album.id).await.unwrap();
        let twice = f.repo.find(album.id).await.unwrap().unwrap();

        assert!(once.favorite);
        assert_eq!(once.favorite, twice.favorite);
        assert_eq!(once.name, twice.name);

        f.service.dislike(&f.caller, album.id).await.unwrap();
        assert!(!f.repo.find(album.id).await.unwrap().unwrap().favorite);

        let events = drain(&mut f.events);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.topic == CONFIG_UPDATED));
    }

    #[tokio::test]
    async fn like_publishes_favorites_in_snapshot() {
        let mut f = fixture();
        let album = f.service.create(&f.caller, "Trip").await.unwrap();
        f.service.create(&f.caller, "Home").await.unwrap();
        drain(&mut f.events);

        f.service.like(&f.caller, album.id).await.unwrap();

        let events = drain(&mut f.events);
        let data = &events[0].data;
        assert_eq!(data["count"]["albums"], 2);
        assert_eq!(data["count"]["favorites"], 1);
        assert_eq!(data["albums"][0]["AlbumName"], "Trip");
        assert_eq!(data["public"], false);
    }

    #[tokio::test]
    async fn like_unknown_album_is_not_found() {
        let mut f = fixture();

        let err = f.service.like(&f.caller, AlbumId::generate()).await.unwrap_err();

        assert!(matches!(err, AlbumError::NotFound));
        assert_eq!(f.repo.write_count(), 0);
        assert_eq!(f.events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn list_reports_applied_bounds() {
        let f = fixture();
        for name in ["A", "B", "C"] {
            f.service.create(&f.caller, name).await.unwrap();
        }

        let form = AlbumSearchForm {
            count: Some(50_000),
            offset: Some(1),
            ..Default::default()
        };
        let page = f.service.list(&form).await.unwrap();

        assert_eq!(page.count, 1000);
        assert_eq!(page.offset, 1);
        assert_eq!(page.albums.len(), 2);
    }
}
