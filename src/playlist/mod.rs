// Playlist - the ordered song queue behind the player panel
// Derived from the filtered songs; title order or shuffled, with a circular cursor

pub mod shuffle; // seeded / entropy-backed permutations

pub use shuffle::Shuffler;

use crate::catalog::{Song, SongId};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Ascending title order: case-insensitive first, then byte order, then id
pub fn title_order(a: &Song, b: &Song) -> Ordering {
    a.song
        .to_lowercase()
        .cmp(&b.song.to_lowercase())
        .then_with(|| a.song.cmp(&b.song))
        .then_with(|| a.id.cmp(&b.id))
}

/// Playlist order for `filtered`: sorted by title, or a fresh permutation when shuffled
pub fn derive_playlist(filtered: &[Song], is_shuffled: bool, shuffler: &mut Shuffler) -> Vec<Song> {
    let mut order = filtered.to_vec();
    order.sort_by(title_order);
    if is_shuffled {
        shuffler.shuffle(&mut order);
    }
    order
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaylistState {
    pub order: Vec<Song>,
    pub current_index: usize,
    pub is_shuffled: bool,
    pub is_playing: bool,
}

impl PlaylistState {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `current_index`, or 0 when it no longer points into `order`
    pub fn clamped_index(&self) -> usize {
        if self.current_index < self.order.len() {
            self.current_index
        } else {
            0
        }
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.order.get(self.clamped_index())
    }

    pub fn current_id(&self) -> Option<SongId> {
        self.current_song().map(|song| song.id)
    }

    /// Circular advance; no-op on an empty playlist
    pub fn next(&mut self) {
        let len = self.order.len();
        if len == 0 {
            self.current_index = 0;
            return;
        }
        self.current_index = (self.clamped_index() + 1) % len;
    }

    /// Circular retreat; no-op on an empty playlist
    pub fn previous(&mut self) {
        let len = self.order.len();
        if len == 0 {
            self.current_index = 0;
            return;
        }
        self.current_index = (self.clamped_index() + len - 1) % len;
    }

    /// Jump to a row. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.order.len() {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn toggle_play(&mut self) {
        self.is_playing = !self.is_playing;
    }
}

/// Keeps a [`PlaylistState`] in step with the filtered song list.
///
/// Only a change of membership (compared by id list) re-derives the order and
/// resets the cursor; re-syncing the same songs leaves everything alone.
#[derive(Debug)]
pub struct Sequencer {
    state: PlaylistState,
    source: Vec<Song>,
    shuffler: Shuffler,
}

impl Sequencer {
    pub fn new(shuffler: Shuffler, start_shuffled: bool) -> Self {
        Self {
            state: PlaylistState {
                is_shuffled: start_shuffled,
                ..PlaylistState::default()
            },
            source: Vec::new(),
            shuffler,
        }
    }

    pub fn state(&self) -> &PlaylistState {
        &self.state
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.state.current_song()
    }

    /// Feed the latest filtered list. Returns whether the playlist changed.
    pub fn sync(&mut self, filtered: &[Song]) -> bool {
        let unchanged = self.source.len() == filtered.len()
            && self
                .source
                .iter()
                .zip(filtered)
                .all(|(old, new)| old.id == new.id);
        if unchanged {
            return false;
        }

        self.source = filtered.to_vec();
        self.state.order = derive_playlist(&self.source, self.state.is_shuffled, &mut self.shuffler);
        self.state.current_index = 0;
        debug!(
            "Playlist re-derived: {} songs (shuffled: {})",
            self.state.order.len(),
            self.state.is_shuffled
        );
        true
    }

    /// Flip shuffle and re-derive the order. The cursor keeps its position
    /// since membership is unchanged.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.state.is_shuffled = !self.state.is_shuffled;
        self.state.order = derive_playlist(&self.source, self.state.is_shuffled, &mut self.shuffler);
        self.state.current_index = self.state.clamped_index();
        debug!("Shuffle {}", if self.state.is_shuffled { "on" } else { "off" });
        self.state.is_shuffled
    }

    pub fn next(&mut self) {
        self.state.next();
    }

    pub fn previous(&mut self) {
        self.state.previous();
    }

    /// The player finished the current video
    pub fn on_video_ended(&mut self) {
        self.state.next();
    }

    pub fn select(&mut self, index: usize) -> bool {
        self.state.select(index)
    }

    pub fn play(&mut self) {
        self.state.play();
    }

    pub fn pause(&mut self) {
        self.state.pause();
    }

    pub fn toggle_play(&mut self) {
        self.state.toggle_play();
    }
}
