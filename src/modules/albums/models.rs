use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Stable, server-assigned album identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(Uuid);

impl AlbumId {
    /// Generate a fresh, time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AlbumId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A named, favorite-able album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(rename = "AlbumUUID")]
    pub id: AlbumId,
    #[serde(rename = "AlbumName")]
    pub name: String,
    #[serde(rename = "AlbumSlug")]
    pub slug: String,
    #[serde(rename = "AlbumFavorite")]
    pub favorite: bool,
    #[serde(rename = "CreatedAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "UpdatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Album {
    /// Build an unsaved album. Timestamps are provisional until the
    /// repository stores it.
    pub fn new(name: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        let id = AlbumId::generate();
        Self {
            id,
            name: name.to_string(),
            slug: album_slug(name, id),
            favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
        self.slug = album_slug(name, self.id);
    }
}

/// Lowercase slug: letters and digits of any script kept, every other run
/// collapsed into a single dash.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Slug for an album; names without a single letter or digit fall back to
/// the album id so no two albums share an empty slug.
fn album_slug(name: &str, id: AlbumId) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        id.to_string()
    } else {
        slug
    }
}

/// Accepts the boolean spellings `1`, `t`, `true`, `0`, `f`, `false` in any
/// letter case.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(Some(true)),
        "0" | "f" | "false" => Ok(Some(false)),
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Str(&raw),
            &"a boolean (true, false, 1 or 0)",
        )),
    }
}

/// Request body for create and rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumParams {
    #[serde(rename = "AlbumName")]
    pub album_name: String,
}

/// Sort order accepted by album search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumOrder {
    /// Favorites first, then by name.
    #[default]
    Favorites,
    Name,
    Newest,
    Oldest,
}

/// Query-string form for `GET /albums`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumSearchForm {
    /// Free-text filter matched against album names.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub favorites: Option<bool>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub order: Option<AlbumOrder>,
}
