// Paadal Library - filter, aggregation and playlist engine for a Tamil film-song catalog
// Charts and the video player live outside; this crate feeds them and reacts to their events

pub mod aggregate; // counts, Others buckets, decade trees, chart datasets
pub mod catalog;   // song records, loading and validation
pub mod config;    // settings and chart budgets
pub mod filter;    // filter state, evaluator, chart-click router
pub mod playback;  // player signals and video lookup seam
pub mod playlist;  // ordered/shuffled queue with a circular cursor
pub mod session;   // single owner of all mutable state
pub mod view;      // reset epoch and per-view ephemeral state

// Export the stuff front-ends actually use
pub use aggregate::{AggregateNode, ChartLimits, TreeOrder};
pub use catalog::{Catalog, CatalogError, Dimension, DimensionValue, Song, SongId};
pub use config::Config;
pub use filter::{evaluate, ChartEvent, FilterState, YearRange};
pub use playback::{LookupStatus, PlaybackSignal, VideoLookup};
pub use playlist::PlaylistState;
pub use session::{Action, Session, SessionError, SessionHandle, SessionOptions, Snapshot};
pub use view::{ResetEpoch, ViewLocal};
