// Session - single owner of filters, playlist and view state
// Every action is applied and all derived data re-computed before dispatch returns

pub mod actor; // tokio task wrapper for multi-threaded hosts

pub use actor::SessionHandle;

use crate::aggregate::{
    area, bubbles, build_tree, count_by, radar, treemap, year_series, AggregateNode,
    ArtistNetworks, Bubble, Bucketed, ChartLimits, CountEntry, DimensionCounts, SeriesTable,
    TreeOrder, TreemapNode, YearCount,
};
use crate::catalog::{Catalog, Dimension, DimensionValue, Song, SongId};
use crate::filter::{evaluate, route, ChartEvent, FilterState, YearRange};
use crate::playback::{LookupError, LookupRequest, LookupStatus, LookupTracker, PlaybackSignal};
use crate::playlist::{PlaylistState, Sequencer, Shuffler};
use crate::view::{ArchaeologyTab, DrillError, DrillState, ResetCoordinator, ResetEpoch, ViewStates};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Drill(#[from] DrillError),

    #[error("session is no longer running")]
    Closed,
}

/// Drill-capable charts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillView {
    /// decade -> lyricist -> composer -> singer
    Sunburst,
    /// decade -> composer -> singer -> lyricist, inside the collaboration explorer
    Collaborations,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // filter inputs
    SetSearch(String),
    ToggleSelected(DimensionValue),
    ToggleDecade(u16),
    ClearSelected(Dimension),
    Chart(ChartEvent),
    ResetAll,

    // transport
    ToggleShuffle,
    Next,
    Previous,
    Select(usize),
    Play,
    Pause,
    TogglePlay,
    Playback(PlaybackSignal),
    LookupResolved {
        song_id: SongId,
        result: Result<String, LookupError>,
    },

    // view-local
    DrillInto { view: DrillView, path: Vec<String> },
    ZoomOut(DrillView),
    OpenOthers { label: String, items: Vec<String> },
    CloseOthers,
    SetArchaeologyTab(ArchaeologyTab),
    SetArchaeologyWindow(YearRange),
    HighlightArtist(Option<String>),
}

impl Action {
    fn changes_filters(&self) -> bool {
        matches!(
            self,
            Action::SetSearch(_)
                | Action::ToggleSelected(_)
                | Action::ToggleDecade(_)
                | Action::ClearSelected(_)
                | Action::Chart(_)
                | Action::ResetAll
        )
    }
}

/// Session settings taken from the config file
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub limits: ChartLimits,
    pub shuffle_seed: Option<u64>,
    pub start_shuffled: bool,
    pub archaeology_window: YearRange,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            limits: ChartLimits::default(),
            shuffle_seed: None,
            start_shuffled: false,
            archaeology_window: YearRange::new(1960, 2024),
        }
    }
}

/// Point-in-time copy of the shared state, as handed to front-ends
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub filters: FilterState,
    pub active_filters: usize,
    pub total_songs: usize,
    pub filtered_songs: usize,
    pub playlist: PlaylistState,
    pub current_song: Option<Song>,
    pub lookup: Option<LookupStatus>,
    pub epoch: ResetEpoch,
}

/// All chart inputs for the current filters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub years: Vec<YearCount>,
    pub singers: Bucketed<CountEntry>,
    pub composers: Bucketed<CountEntry>,
    pub lyricists: Bucketed<CountEntry>,
    pub sunburst: AggregateNode,
    pub radar: SeriesTable,
    pub treemap: Vec<TreemapNode>,
    pub bubbles: Vec<Bubble>,
    pub area: SeriesTable,
}

pub struct Session {
    catalog: Arc<Catalog>,
    limits: ChartLimits,
    filters: FilterState,
    filtered: Vec<Song>,
    sequencer: Sequencer,
    reset: ResetCoordinator,
    views: ViewStates,
    lookup: LookupTracker,
    lookup_request: Option<LookupRequest>,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, options: SessionOptions) -> Self {
        let reset = ResetCoordinator::new();
        let views = ViewStates::new(options.archaeology_window, reset.epoch());
        let mut session = Self {
            catalog,
            limits: options.limits,
            filters: FilterState::default(),
            filtered: Vec::new(),
            sequencer: Sequencer::new(Shuffler::new(options.shuffle_seed), options.start_shuffled),
            reset,
            views,
            lookup: LookupTracker::new(),
            lookup_request: None,
        };
        session.refresh();
        session.track_current_song();
        info!(
            "Session started with {} songs (shuffle seed: {:?})",
            session.catalog.len(),
            options.shuffle_seed
        );
        session
    }

    /// Apply one action and re-derive everything that depends on it
    pub fn dispatch(&mut self, action: Action) -> Result<(), SessionError> {
        debug!("Dispatch {:?}", action);
        let refilter = action.changes_filters();
        let epoch = self.reset.epoch();

        match action {
            Action::SetSearch(term) => self.filters.set_search_term(term),
            Action::ToggleSelected(value) => {
                self.filters.toggle_selected(value);
            }
            Action::ToggleDecade(decade) => {
                let years = self
                    .catalog
                    .years_by_decade()
                    .remove(&decade)
                    .unwrap_or_default();
                self.filters.toggle_decade(&years);
            }
            Action::ClearSelected(dimension) => self.filters.clear_selected(dimension),
            Action::Chart(event) => self.filters = route(&self.filters, &event),
            Action::ResetAll => {
                let (filters, epoch) = self.reset.reset();
                self.filters = filters;
                self.views.observe(epoch);
            }

            Action::ToggleShuffle => {
                self.sequencer.toggle_shuffle();
            }
            Action::Next => self.sequencer.next(),
            Action::Previous => self.sequencer.previous(),
            Action::Select(index) => {
                self.sequencer.select(index);
            }
            Action::Play => self.sequencer.play(),
            Action::Pause => self.sequencer.pause(),
            Action::TogglePlay => self.sequencer.toggle_play(),
            Action::Playback(signal) => self.on_playback_signal(signal),
            Action::LookupResolved { song_id, result } => {
                self.lookup.resolve(song_id, result);
            }

            Action::DrillInto { view, path } => {
                let tree = self.drill_tree(view);
                self.drill_state_mut(view, epoch).zoom_into(&tree, &path)?;
            }
            Action::ZoomOut(view) => self.drill_state_mut(view, epoch).zoom_out(),
            Action::OpenOthers { label, items } => self.views.others.get_mut(epoch).open(label, items),
            Action::CloseOthers => self.views.others.get_mut(epoch).close(),
            Action::SetArchaeologyTab(tab) => self.views.archaeology.get_mut(epoch).set_tab(tab),
            Action::SetArchaeologyWindow(window) => {
                let state = self.views.archaeology.get_mut(epoch);
                state.year_window = window;
                state.drill.zoom_out();
            }
            Action::HighlightArtist(artist) => self.views.archaeology.get_mut(epoch).highlight(artist),
        }

        if refilter {
            self.refresh();
        }
        self.track_current_song();
        Ok(())
    }

    fn on_playback_signal(&mut self, signal: PlaybackSignal) {
        match signal {
            PlaybackSignal::Ready => debug!("Player ready"),
            PlaybackSignal::PlayStarted => self.sequencer.play(),
            PlaybackSignal::Paused => self.sequencer.pause(),
            PlaybackSignal::Ended => self.sequencer.on_video_ended(),
            PlaybackSignal::Error(reason) => self.lookup.mark_unavailable(reason),
        }
    }

    fn refresh(&mut self) {
        self.filtered = evaluate(&self.catalog, &self.filters);
        self.sequencer.sync(&self.filtered);
        self.prune_drills();
    }

    /// Drilled views whose node vanished from the re-derived tree go back to the overview
    fn prune_drills(&mut self) {
        let epoch = self.reset.epoch();
        for view in [DrillView::Sunburst, DrillView::Collaborations] {
            if self.drill_state_mut(view, epoch).is_overview() {
                continue;
            }
            let tree = self.drill_tree(view);
            self.drill_state_mut(view, epoch).prune(&tree);
        }
    }

    /// Queue a lookup whenever the current song changes
    fn track_current_song(&mut self) {
        match self.sequencer.current_song() {
            Some(song) => {
                if self.lookup.begin(song.id) {
                    self.lookup_request = Some(LookupRequest::for_song(song));
                }
            }
            None => {
                self.lookup.clear();
                self.lookup_request = None;
            }
        }
    }

    /// Lookup the host should start for the current song, if one is due
    pub fn take_lookup_request(&mut self) -> Option<LookupRequest> {
        self.lookup_request.take()
    }

    fn drill_state_mut(&mut self, view: DrillView, epoch: ResetEpoch) -> &mut DrillState {
        match view {
            DrillView::Sunburst => self.views.sunburst.get_mut(epoch),
            DrillView::Collaborations => &mut self.views.archaeology.get_mut(epoch).drill,
        }
    }

    fn drill_tree(&self, view: DrillView) -> AggregateNode {
        match view {
            DrillView::Sunburst => self.tree(TreeOrder::LyricistComposerSinger),
            DrillView::Collaborations => self.collaboration_tree(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filtered(&self) -> &[Song] {
        &self.filtered
    }

    pub fn playlist(&self) -> &PlaylistState {
        self.sequencer.state()
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.sequencer.current_song()
    }

    pub fn lookup_status(&self) -> Option<&LookupStatus> {
        self.lookup.status()
    }

    pub fn epoch(&self) -> ResetEpoch {
        self.reset.epoch()
    }

    pub fn views(&self) -> &ViewStates {
        &self.views
    }

    pub fn limits(&self) -> &ChartLimits {
        &self.limits
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            filters: self.filters.clone(),
            active_filters: self.filters.active_filter_count(),
            total_songs: self.catalog.len(),
            filtered_songs: self.filtered.len(),
            playlist: self.playlist().clone(),
            current_song: self.current_song().cloned(),
            lookup: self.lookup_status().cloned(),
            epoch: self.epoch(),
        }
    }

    pub fn counts(&self, dimension: Dimension) -> DimensionCounts {
        count_by(&self.filtered, dimension)
    }

    pub fn tree(&self, order: TreeOrder) -> AggregateNode {
        build_tree(&self.filtered, order)
    }

    /// Artist networks over the filtered songs, limited to the explorer's year window
    pub fn networks(&self) -> ArtistNetworks {
        let window = self.views.archaeology.peek().year_window;
        ArtistNetworks::build(&self.filtered).within(window)
    }

    /// Collaboration sunburst: songs of every collaboration active in the year window
    pub fn collaboration_tree(&self) -> AggregateNode {
        let songs: HashSet<SongId> = self
            .networks()
            .collaborations
            .into_iter()
            .flat_map(|collab| collab.songs)
            .collect();
        let members: Vec<Song> = self
            .filtered
            .iter()
            .filter(|song| songs.contains(&song.id))
            .cloned()
            .collect();
        build_tree(&members, TreeOrder::ComposerSingerLyricist)
    }

    pub fn dashboard(&self) -> Dashboard {
        let songs = &self.filtered;
        let limits = &self.limits;
        let top = |dimension: Dimension| count_by(songs, dimension).with_others(limits.top_for(dimension));
        Dashboard {
            years: year_series(songs),
            singers: top(Dimension::Singer),
            composers: top(Dimension::Composer),
            lyricists: top(Dimension::Lyricist),
            sunburst: build_tree(songs, TreeOrder::LyricistComposerSinger),
            radar: radar(songs, limits.radar_max_singers, limits.radar_years),
            treemap: treemap(songs, limits),
            bubbles: bubbles(songs, limits.bubble_max),
            area: area(songs, limits.area_max_decades),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::song::fixtures::five_songs;

    fn session() -> Session {
        let catalog = Arc::new(Catalog::new(five_songs()).unwrap());
        Session::new(
            catalog,
            SessionOptions {
                shuffle_seed: Some(42),
                ..SessionOptions::default()
            },
        )
    }

    fn filtered_ids(session: &Session) -> Vec<u64> {
        session.filtered().iter().map(|s| s.id.0).collect()
    }

    #[test]
    fn test_starts_unfiltered_with_title_order() {
        let session = session();
        assert_eq!(filtered_ids(&session), vec![1, 2, 3, 4, 5]);
        assert_eq!(session.current_song().unwrap().song, "Anbe");
        let request = session.lookup_request.clone().unwrap();
        assert_eq!(request.song_id, SongId(5));
    }

    #[test]
    fn test_filter_change_rederives_before_returning() {
        let mut session = session();
        session.dispatch(Action::Next).unwrap();
        session.dispatch(Action::Next).unwrap();
        assert_eq!(session.playlist().current_index, 2);

        session
            .dispatch(Action::ToggleSelected(DimensionValue::Year(1999)))
            .unwrap();
        assert_eq!(filtered_ids(&session), vec![4, 5]);
        assert_eq!(session.playlist().len(), 2);
        assert_eq!(session.playlist().current_index, 0);
        assert_eq!(session.counts(Dimension::Year).total(), 2);
    }

    #[test]
    fn test_chart_click_toggles() {
        let mut session = session();
        let click = Action::Chart(ChartEvent::Select {
            value: DimensionValue::Composer("A".into()),
        });
        session.dispatch(click.clone()).unwrap();
        assert_eq!(filtered_ids(&session), vec![1, 2]);
        session.dispatch(click).unwrap();
        assert_eq!(filtered_ids(&session), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_decade_toggle_uses_catalog_years() {
        let mut session = session();
        session.dispatch(Action::ToggleDecade(1960)).unwrap();
        assert_eq!(filtered_ids(&session), vec![1, 2]);
        session.dispatch(Action::ToggleDecade(1960)).unwrap();
        assert!(session.filters().is_unfiltered());
        // unknown decade is a no-op
        session.dispatch(Action::ToggleDecade(1800)).unwrap();
        assert_eq!(filtered_ids(&session).len(), 5);
    }

    #[test]
    fn test_reset_is_complete() {
        let mut session = session();
        session.dispatch(Action::SetSearch("x".into())).unwrap();
        session
            .dispatch(Action::Chart(ChartEvent::Brush { from: 1960, to: 1980 }))
            .unwrap();
        session
            .dispatch(Action::DrillInto {
                view: DrillView::Sunburst,
                path: vec!["1960s".into()],
            })
            .unwrap();
        session
            .dispatch(Action::OpenOthers {
                label: "Others (2 singers)".into(),
                items: vec!["Y".into(), "Z".into()],
            })
            .unwrap();
        session
            .dispatch(Action::SetArchaeologyTab(ArchaeologyTab::Singers))
            .unwrap();
        assert_eq!(filtered_ids(&session), vec![1, 3]);
        assert!(!session.views().all_initial());

        let before = session.epoch();
        session.dispatch(Action::ResetAll).unwrap();
        assert!(session.epoch() > before);
        assert_eq!(filtered_ids(&session), vec![1, 2, 3, 4, 5]);
        assert!(session.views().all_initial());
        assert_eq!(session.views().sunburst.peek(), &DrillState::Overview);
    }

    #[test]
    fn test_invalid_drill_is_reported() {
        let mut session = session();
        let err = session
            .dispatch(Action::DrillInto {
                view: DrillView::Sunburst,
                path: vec!["1880s".into()],
            })
            .unwrap_err();
        assert!(matches!(err, SessionError::Drill(DrillError::UnknownNode(_))));

        session
            .dispatch(Action::DrillInto {
                view: DrillView::Collaborations,
                path: vec!["1990s".into(), "C".into()],
            })
            .unwrap();
        assert_eq!(
            session.views().archaeology.peek().drill.path(),
            &["1990s".to_string(), "C".to_string()]
        );
    }

    #[test]
    fn test_filter_change_releases_vanished_drill() {
        let mut session = session();
        for view in [DrillView::Sunburst, DrillView::Collaborations] {
            session
                .dispatch(Action::DrillInto {
                    view,
                    path: vec!["1960s".into()],
                })
                .unwrap();
        }

        session
            .dispatch(Action::ToggleSelected(DimensionValue::Year(1999)))
            .unwrap();
        assert_eq!(session.views().sunburst.peek(), &DrillState::Overview);
        assert!(session.views().archaeology.peek().drill.is_overview());

        for view in [DrillView::Sunburst, DrillView::Collaborations] {
            session
                .dispatch(Action::DrillInto {
                    view,
                    path: vec!["1990s".into()],
                })
                .unwrap();
        }
        assert_eq!(session.views().sunburst.peek().path(), &["1990s".to_string()]);
        assert_eq!(
            session.views().archaeology.peek().drill.path(),
            &["1990s".to_string()]
        );
    }

    #[test]
    fn test_filter_change_keeps_surviving_drill() {
        let mut session = session();
        session
            .dispatch(Action::DrillInto {
                view: DrillView::Sunburst,
                path: vec!["1990s".into()],
            })
            .unwrap();
        session
            .dispatch(Action::ToggleSelected(DimensionValue::Year(1999)))
            .unwrap();
        assert_eq!(session.views().sunburst.peek().path(), &["1990s".to_string()]);
    }

    #[test]
    fn test_shuffled_playlist_shrinks_with_filter() {
        let songs: Vec<Song> = five_songs().into_iter().take(3).collect();
        let mut session = Session::new(
            Arc::new(Catalog::new(songs).unwrap()),
            SessionOptions {
                shuffle_seed: Some(7),
                ..SessionOptions::default()
            },
        );
        session.dispatch(Action::ToggleShuffle).unwrap();
        assert!(session.playlist().is_shuffled);
        assert_eq!(session.playlist().len(), 3);
        session.dispatch(Action::Next).unwrap();
        assert_eq!(session.playlist().current_index, 1);

        session
            .dispatch(Action::Chart(ChartEvent::Select {
                value: DimensionValue::Composer("A".into()),
            }))
            .unwrap();
        assert!(session.playlist().is_shuffled);
        assert_eq!(session.playlist().len(), 2);
        assert_eq!(session.playlist().current_index, 0);
        let mut ids: Vec<u64> = session.playlist().order.iter().map(|s| s.id.0).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_playback_signals() {
        let mut session = session();
        session.dispatch(Action::Playback(PlaybackSignal::PlayStarted)).unwrap();
        assert!(session.playlist().is_playing);
        session.dispatch(Action::Playback(PlaybackSignal::Ended)).unwrap();
        assert_eq!(session.playlist().current_index, 1);

        let current = session.current_song().unwrap().id;
        session
            .dispatch(Action::Playback(PlaybackSignal::Error("blocked".into())))
            .unwrap();
        assert_eq!(
            session.lookup_status(),
            Some(&LookupStatus::Unavailable("blocked".into()))
        );
        // an error never touches filters or the cursor
        assert!(session.filters().is_unfiltered());
        assert_eq!(session.current_song().unwrap().id, current);

        session.dispatch(Action::Playback(PlaybackSignal::Paused)).unwrap();
        assert!(!session.playlist().is_playing);
    }

    #[test]
    fn test_lookup_follows_current_song() {
        let mut session = session();
        let first = session.take_lookup_request().unwrap();
        assert!(session.take_lookup_request().is_none());

        session.dispatch(Action::Next).unwrap();
        let second = session.take_lookup_request().unwrap();
        assert_ne!(first.song_id, second.song_id);

        // late answer for the first song is ignored
        session
            .dispatch(Action::LookupResolved {
                song_id: first.song_id,
                result: Ok("late".into()),
            })
            .unwrap();
        assert_eq!(session.lookup_status(), Some(&LookupStatus::Pending));

        session
            .dispatch(Action::LookupResolved {
                song_id: second.song_id,
                result: Ok("vid".into()),
            })
            .unwrap();
        assert_eq!(
            session.lookup_status(),
            Some(&LookupStatus::Playable("vid".into()))
        );
    }

    #[test]
    fn test_empty_result_set() {
        let mut session = session();
        session.dispatch(Action::SetSearch("nothing-matches".into())).unwrap();
        assert!(session.filtered().is_empty());
        assert!(session.current_song().is_none());
        assert!(session.lookup_status().is_none());
        session.dispatch(Action::Next).unwrap();

        let dashboard = session.dashboard();
        assert_eq!(dashboard.sunburst.value, 0);
        assert!(dashboard.years.is_empty());
        assert!(dashboard.treemap.is_empty());
    }

    #[test]
    fn test_archaeology_window_limits_networks() {
        let mut session = session();
        session
            .dispatch(Action::SetArchaeologyWindow(YearRange::new(1970, 1979)))
            .unwrap();
        let networks = session.networks();
        assert_eq!(networks.collaborations.len(), 1);
        assert_eq!(session.collaboration_tree().value, 1);
    }

    #[test]
    fn test_dashboard_sums() {
        let dashboard = session().dashboard();
        assert_eq!(dashboard.sunburst.value, 5);
        assert!(dashboard.sunburst.is_sum_consistent());
        assert_eq!(dashboard.years.iter().map(|y| y.count).sum::<usize>(), 5);
        assert_eq!(dashboard.singers.kept.len(), 3);
    }
}
