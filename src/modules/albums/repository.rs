//! Album persistence port and its in-memory implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::models::{Album, AlbumId};
use super::query::AlbumQuery;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Another album already uses this name.
    #[error("\"{name}\" already exists")]
    NameTaken { name: String },

    #[error("album {0} not found")]
    NotFound(AlbumId),

    #[error("album id {0} is already in use")]
    DuplicateId(AlbumId),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Storage for album records. The repository is the only writer and owns
/// the unique-name constraint and both timestamps.
#[async_trait]
pub trait AlbumRepository: Send + Sync {
    async fn find(&self, id: AlbumId) -> Result<Option<Album>, RepositoryError>;

    /// Albums matching `query`, ordered and paged by it.
    async fn find_matching(&self, query: &AlbumQuery) -> Result<Vec<Album>, RepositoryError>;

    /// Number of albums matching `query`, ignoring its paging.
    async fn count(&self, query: &AlbumQuery) -> Result<usize, RepositoryError>;

    /// Insert a new album, stamping `created_at` and `updated_at`.
    ///
    /// Fails with [`RepositoryError::NameTaken`] without writing anything when
    /// the name is already used.
    async fn create(&self, album: Album) -> Result<Album, RepositoryError>;

    /// Replace a stored album, stamping `updated_at`. `created_at` is kept
    /// from the stored record.
    async fn save(&self, album: Album) -> Result<Album, RepositoryError>;
}

/// Process-local album store.
#[derive(Debug, Default)]
pub struct MemoryAlbumRepository {
    albums: RwLock<HashMap<AlbumId, Album>>,
    writes: AtomicU64,
}

impl MemoryAlbumRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed writes since construction.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.albums.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.albums.read().await.is_empty()
    }

    fn name_taken(albums: &HashMap<AlbumId, Album>, name: &str, except: Option<AlbumId>) -> bool {
        albums
            .values()
            .any(|a| a.name == name && Some(a.id) != except)
    }
}

#[async_trait]
impl AlbumRepository for MemoryAlbumRepository {
    async fn find(&self, id: AlbumId) -> Result<Option<Album>, RepositoryError> {
        Ok(self.albums.read().await.get(&id).cloned())
    }

    async fn find_matching(&self, query: &AlbumQuery) -> Result<Vec<Album>, RepositoryError> {
        let albums = self.albums.read().await;
        Ok(query.apply(albums.values().cloned()))
    }

    async fn count(&self, query: &AlbumQuery) -> Result<usize, RepositoryError> {
        let albums = self.albums.read().await;
        Ok(albums.values().filter(|a| query.matches(a)).count())
    }

    async fn create(&self, mut album: Album) -> Result<Album, RepositoryError> {
        let mut albums = self.albums.write().await;

        if albums.contains_key(&album.id) {
            return Err(RepositoryError::DuplicateId(album.id));
        }
        if Self::name_taken(&albums, &album.name, None) {
            return Err(RepositoryError::NameTaken { name: album.name });
        }

        let now = OffsetDateTime::now_utc();
        album.created_at = now;
        album.updated_at = now;

        albums.insert(album.id, album.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(album)
    }

    async fn save(&self, mut album: Album) -> Result<Album, RepositoryError> {
        let mut albums = self.albums.write().await;

        let Some(stored) = albums.get(&album.id) else {
            return Err(RepositoryError::NotFound(album.id));
        };
        if Self::name_taken(&albums, &album.name, Some(album.id)) {
            return Err(RepositoryError::NameTaken { name: album.name });
        }

        album.created_at = stored.created_at;
        album.updated_at = OffsetDateTime::now_utc();

        albums.insert(album.id, album.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(album)
    }
}
