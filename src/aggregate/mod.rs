// Aggregation - every chart's input derived from the filtered songs
// Flat counts with Others buckets, decade trees, collaborations and chart tables

pub mod charts;  // radar / treemap / bubble / area datasets
pub mod collab;  // (composer, singer, lyricist) groups and artist networks
pub mod counts;  // count_by, top-N, Others bucketing, year series
pub mod tree;    // four-level decade hierarchies

pub use charts::{area, bubbles, radar, treemap, Bubble, ChartLimits, SeriesRow, SeriesTable, TreemapNode};
pub use collab::{group_collaborations, ArtistNetworks, ArtistProfile, Collaboration, Collaborators};
pub use counts::{bucket_others, count_by, year_series, Bucketed, CountEntry, DimensionCounts, Others, YearCount};
pub use tree::{build_tree, parse_decade_label, AggregateNode, TreeOrder, ROOT_NAME};
