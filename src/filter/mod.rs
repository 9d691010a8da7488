// Filtering - what the user has narrowed the catalog down to
// State store, the pure evaluator over it, and the chart-click router feeding it

pub mod evaluator; // (catalog, filters) -> filtered songs
pub mod router;    // chart clicks -> filter toggles
pub mod search;    // free-text tokenising and matching
pub mod state;     // multi-select sets + chart-click values

pub use evaluator::{evaluate, filter_songs, SongPredicate};
pub use router::{route, toggle_dimension_filter, toggle_year_range, ChartEvent};
pub use search::SearchQuery;
pub use state::{ChartFilter, FilterState, YearRange};
