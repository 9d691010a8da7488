use super::search::SearchQuery;
use super::state::FilterState;
use crate::catalog::{Catalog, Dimension, Song};
use tracing::debug;

/// A filter state compiled for repeated matching (the search term is tokenised once).
pub struct SongPredicate<'a> {
    query: SearchQuery,
    state: &'a FilterState,
}

impl<'a> SongPredicate<'a> {
    pub fn new(state: &'a FilterState) -> Self {
        Self {
            query: SearchQuery::parse(&state.search_term),
            state,
        }
    }

    pub fn matches_search(&self, song: &Song) -> bool {
        self.query.matches(song)
    }

    /// Multi-select set AND chart-click value for one dimension.
    /// The year range is part of the year dimension.
    pub fn matches_dimension(&self, song: &Song, dimension: Dimension) -> bool {
        let chart = &self.state.chart;
        match dimension {
            Dimension::Year => {
                let in_set = self.state.selected_years.is_empty()
                    || self.state.selected_years.contains(&song.year);
                let chart_year = chart.year().map_or(true, |year| song.year == year);
                let chart_range = chart
                    .year_range()
                    .map_or(true, |range| range.contains(song.year));
                in_set && chart_year && chart_range
            }
            _ => {
                let value = song.name_of(dimension).unwrap_or_default();
                let selected = match dimension {
                    Dimension::Singer => &self.state.selected_singers,
                    Dimension::Composer => &self.state.selected_composers,
                    _ => &self.state.selected_lyricists,
                };
                let in_set = selected.is_empty() || selected.contains(value);
                let chart_value = chart.name(dimension).map_or(true, |name| name == value);
                in_set && chart_value
            }
        }
    }

    pub fn matches(&self, song: &Song) -> bool {
        self.matches_search(song)
            && Dimension::ALL
                .iter()
                .all(|&dimension| self.matches_dimension(song, dimension))
    }
}

/// Songs of `catalog` that satisfy every active criterion, in catalog order.
pub fn evaluate(catalog: &Catalog, state: &FilterState) -> Vec<Song> {
    let filtered = filter_songs(catalog.songs(), state);
    debug!(
        "Filter matched {} of {} songs ({} active criteria)",
        filtered.len(),
        catalog.len(),
        state.active_filter_count()
    );
    filtered
}

pub fn filter_songs(songs: &[Song], state: &FilterState) -> Vec<Song> {
    let predicate = SongPredicate::new(state);
    songs
        .iter()
        .filter(|song| predicate.matches(song))
        .cloned()
        .collect()
}
