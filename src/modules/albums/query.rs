//! Translation of a validated search form into a repository query.

use folio_kernel::settings::AlbumSettings;

use super::models::{Album, AlbumOrder, AlbumSearchForm};

/// Filter, order and page bounds for one album search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumQuery {
    /// Lowercased name fragment, already trimmed. `None` matches everything.
    pub text: Option<String>,
    pub favorites_only: bool,
    pub order: AlbumOrder,
    pub count: usize,
    pub offset: usize,
}

impl AlbumQuery {
    /// Build a query from a search form.
    ///
    /// A missing or zero `count` falls back to the configured default and a
    /// count above the configured maximum is clamped to it. The returned
    /// `count`/`offset` are the values actually applied.
    pub fn from_form(form: &AlbumSearchForm, settings: &AlbumSettings) -> Self {
        let max_count = settings.max_count.max(1);
        let count = match form.count {
            None | Some(0) => settings.default_count.clamp(1, max_count),
            Some(count) => count.min(max_count),
        };

        let text = form
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        Self {
            text,
            favorites_only: form.favorites.unwrap_or(false),
            order: form.order.unwrap_or_default(),
            count,
            offset: form.offset.unwrap_or(0),
        }
    }

    /// Favorite albums ordered by name, as shown in client navigation.
    pub fn favorites(limit: usize) -> Self {
        Self {
            text: None,
            favorites_only: true,
            order: AlbumOrder::Name,
            count: limit,
            offset: 0,
        }
    }

    pub fn matches(&self, album: &Album) -> bool {
        if self.favorites_only && !album.favorite {
            return false;
        }

        match &self.text {
            Some(text) => album.name.to_lowercase().contains(text.as_str()),
            None => true,
        }
    }

    /// Sort `albums` in place according to the query order. Ties fall back to
    /// the album id, which is creation-ordered.
    pub fn sort(&self, albums: &mut [Album]) {
        match self.order {
            AlbumOrder::Favorites => albums.sort_by(|a, b| {
                b.favorite
                    .cmp(&a.favorite)
                    .then_with(|| a.name.cmp(&b.name))
                    .then_with(|| a.id.cmp(&b.id))
            }),
            AlbumOrder::Name => {
                albums.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)))
            }
            AlbumOrder::Newest => albums.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            }),
            AlbumOrder::Oldest => albums.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
    }

    /// Filter, sort and page a full album set.
    pub fn apply(&self, albums: impl IntoIterator<Item = Album>) -> Vec<Album> {
        let mut matching: Vec<Album> = albums.into_iter().filter(|a| self.matches(a)).collect();
        self.sort(&mut matching);
        matching
            .into_iter()
            .skip(self.offset)
            .take(self.count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AlbumSettings {
        AlbumSettings {
            default_count: 100,
            max_count: 1000,
        }
    }

    fn album(name: &str, favorite: bool) -> Album {
        let mut album = Album::new(name);
        album.favorite = favorite;
        album
    }

    #[test]
    fn empty_form_uses_defaults() {
        let query = AlbumQuery::from_form(&AlbumSearchForm::default(), &settings());
        assert_eq!(query.count, 100);
        assert_eq!(query.offset, 0);
        assert_eq!(query.order, AlbumOrder::Favorites);
        assert_eq!(query.text, None);
        assert!(!query.favorites_only);
    }

    #[test]
    fn count_is_clamped_to_maximum() {
        let form = AlbumSearchForm {
            count: Some(5000),
            offset: Some(20),
            ..Default::default()
        };
        let query = AlbumQuery::from_form(&form, &settings());
        assert_eq!(query.count, 1000);
        assert_eq!(query.offset, 20);
    }

    #[test]
    fn zero_count_falls_back_to_default() {
        let form = AlbumSearchForm {
            count: Some(0),
            ..Default::default()
        };
        assert_eq!(AlbumQuery::from_form(&form, &settings()).count, 100);
    }

    #[test]
    fn blank_text_is_ignored() {
        let form = AlbumSearchForm {
            q: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(AlbumQuery::from_form(&form, &settings()).text, None);
    }

    #[test]
    fn text_filter_is_case_insensitive() {
        let form = AlbumSearchForm {
            q: Some(" TRIP ".to_string()),
            ..Default::default()
        };
        let query = AlbumQuery::from_form(&form, &settings());

        let result = query.apply(vec![album("Summer Trip", false), album("Family", false)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Summer Trip");
    }

    #[test]
    fn default_order_puts_favorites_first() {
        let query = AlbumQuery::from_form(&AlbumSearchForm::default(), &settings());
        let result = query.apply(vec![
            album("Alpha", false),
            album("Zulu", true),
            album("Bravo", false),
        ]);

        let names: Vec<_> = result.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Zulu", "Alpha", "Bravo"]);
    }

    #[test]
    fn favorites_query_excludes_unliked() {
        let query = AlbumQuery::favorites(10);
        let result = query.apply(vec![album("B", true), album("C", false), album("A", true)]);

        let names: Vec<_> = result.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn offset_and_count_page_the_result() {
        let form = AlbumSearchForm {
            count: Some(2),
            offset: Some(1),
            order: Some(AlbumOrder::Name),
            ..Default::default()
        };
        let query = AlbumQuery::from_form(&form, &settings());
        let result = query.apply(vec![
            album("A", false),
            album("B", false),
            album("C", false),
            album("D", false),
        ]);

        let names: Vec<_> = result.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn newest_orders_by_creation_descending() {
        let first = album("First", false);
        let mut second = album("Second", false);
        second.created_at = first.created_at + time::Duration::seconds(1);

        let form = AlbumSearchForm {
            order: Some(AlbumOrder::Newest),
            ..Default::default()
        };
        let query = AlbumQuery::from_form(&form, &settings());

        let result = query.apply(vec![first, second]);
        assert_eq!(result[0].name, "Second");
    }

    #[test]
    fn favorites_form_keeps_only_liked_albums() {
        let form = AlbumSearchForm {
            favorites: Some(true),
            ..Default::default()
        };
        let query = AlbumQuery::from_form(&form, &settings());
        assert!(query.favorites_only);

        let result = query.apply(vec![
            album("Beach", true),
            album("City", false),
            album("Alps", true),
        ]);
        let names: Vec<_> = result.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Alps", "Beach"]);
    }

    #[test]
    fn oldest_orders_by_creation_ascending() {
        let mut first = album("First", false);
        let second = album("Second", false);
        first.created_at = second.created_at - time::Duration::seconds(1);

        let form = AlbumSearchForm {
            order: Some(AlbumOrder::Oldest),
            ..Default::default()
        };
        let query = AlbumQuery::from_form(&form, &settings());

        let result = query.apply(vec![second, first]);
        let names: Vec<_> = result.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}
