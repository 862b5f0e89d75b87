//! Pure derivation of the visible track list from the catalog.

use crate::catalog::Track;

/// Which slice of the catalog the track list shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    /// Every track.
    #[default]
    ForYou,
    /// Only tracks flagged `top_track`.
    TopTracks,
}

impl Filter {
    pub fn label(self) -> &'static str {
        match self {
            Filter::ForYou => "For You",
            Filter::TopTracks => "Top Tracks",
        }
    }

    /// The other filter.
    pub fn toggled(self) -> Self {
        match self {
            Filter::ForYou => Filter::TopTracks,
            Filter::TopTracks => Filter::ForYou,
        }
    }

    pub fn admits(self, track: &Track) -> bool {
        match self {
            Filter::ForYou => true,
            Filter::TopTracks => track.top_track,
        }
    }
}

/// Case-insensitive substring match against name OR artist.
///
/// `query_lower` must already be lowercased. An empty query matches everything.
pub fn matches_query(track: &Track, query_lower: &str) -> bool {
    if query_lower.is_empty() {
        return true;
    }
    track.name.to_lowercase().contains(query_lower)
        || track.artist.to_lowercase().contains(query_lower)
}

/// Catalog indices surviving `filter`, then `query`, in catalog order.
pub fn derive_visible_tracks(catalog: &[Track], filter: Filter, query: &str) -> Vec<usize> {
    let query_lower = query.to_lowercase();
    catalog
        .iter()
        .enumerate()
        .filter(|(_, t)| filter.admits(t))
        .filter(|(_, t)| matches_query(t, &query_lower))
        .map(|(i, _)| i)
        .collect()
}
