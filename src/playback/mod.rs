// Playback boundary - what the external video player sends and receives
// Player signals, the video lookup seam, and per-song lookup tracking

use crate::catalog::{Song, SongId};
use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// State changes reported by the embedded player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "reason", rename_all = "snake_case")]
pub enum PlaybackSignal {
    Ready,
    PlayStarted,
    Paused,
    Ended,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("video lookup is not configured")]
    NotConfigured,

    #[error("no video found for '{0}'")]
    NotFound(String),

    #[error("video search failed: {0}")]
    Failed(String),
}

/// Search text sent to the video index for one song
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRequest {
    pub song_id: SongId,
    pub query: String,
}

impl LookupRequest {
    pub fn for_song(song: &Song) -> Self {
        Self {
            song_id: song.id,
            query: format!("{} {} {} tamil song", song.song, song.movie, song.singer),
        }
    }
}

/// Finds a playable video id for a song. Implementations do their own I/O;
/// the session only awaits the returned future off its own task.
pub trait VideoLookup: Send + Sync {
    fn search(&self, request: LookupRequest) -> BoxFuture<'static, Result<String, LookupError>>;
}

/// Used when no video index is configured; every lookup fails
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLookup;

impl VideoLookup for DisabledLookup {
    fn search(&self, _request: LookupRequest) -> BoxFuture<'static, Result<String, LookupError>> {
        future::ready(Err(LookupError::NotConfigured)).boxed()
    }
}

/// Fixed song -> video table
#[derive(Debug, Default, Clone)]
pub struct StaticLookup {
    videos: HashMap<SongId, String>,
}

impl StaticLookup {
    pub fn new(videos: impl IntoIterator<Item = (SongId, String)>) -> Self {
        Self {
            videos: videos.into_iter().collect(),
        }
    }
}

impl VideoLookup for StaticLookup {
    fn search(&self, request: LookupRequest) -> BoxFuture<'static, Result<String, LookupError>> {
        let result = self
            .videos
            .get(&request.song_id)
            .cloned()
            .ok_or(LookupError::NotFound(request.query));
        future::ready(result).boxed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum LookupStatus {
    Pending,
    Playable(String),
    /// Shown as "playback unavailable for this song"
    Unavailable(String),
}

/// Lookup state for the current song only.
///
/// Results are matched by song id, so an answer for a song that is no longer
/// current is dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LookupTracker {
    current: Option<(SongId, LookupStatus)>,
}

impl LookupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `song_id`. Returns false when it is already tracked.
    pub fn begin(&mut self, song_id: SongId) -> bool {
        if self.current_id() == Some(song_id) {
            return false;
        }
        debug!("Video lookup started for song {}", song_id);
        self.current = Some((song_id, LookupStatus::Pending));
        true
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Record a lookup result. Returns false when the result is stale.
    pub fn resolve(&mut self, song_id: SongId, result: Result<String, LookupError>) -> bool {
        match &mut self.current {
            Some((current, status)) if *current == song_id => {
                *status = match result {
                    Ok(video_id) => {
                        debug!("Song {} playable as video {}", song_id, video_id);
                        LookupStatus::Playable(video_id)
                    }
                    Err(e) => {
                        warn!("Playback unavailable for song {}: {}", song_id, e);
                        LookupStatus::Unavailable(e.to_string())
                    }
                };
                true
            }
            _ => {
                debug!("Ignoring stale lookup result for song {}", song_id);
                false
            }
        }
    }

    /// The player failed on the current song
    pub fn mark_unavailable(&mut self, reason: impl Into<String>) {
        if let Some((song_id, status)) = &mut self.current {
            let reason = reason.into();
            warn!("Player error on song {}: {}", song_id, reason);
            *status = LookupStatus::Unavailable(reason);
        }
    }

    pub fn current_id(&self) -> Option<SongId> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    pub fn status(&self) -> Option<&LookupStatus> {
        self.current.as_ref().map(|(_, status)| status)
    }

    pub fn video_id(&self) -> Option<&str> {
        match self.status()? {
            LookupStatus::Playable(video_id) => Some(video_id.as_str()),
            _ => None,
        }
    }
}
