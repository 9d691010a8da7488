use crate::catalog::{Dimension, DimensionValue, Song};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub key: DimensionValue,
    pub count: usize,
}

/// Synthetic entry standing in for everything past the displayed top-N.
/// Keeps the folded items so a drill-down can list them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Others<T> {
    pub label: String,
    pub count: usize,
    pub items: Vec<T>,
}

/// A ranked list cut down to a display budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucketed<T> {
    pub kept: Vec<T>,
    pub others: Option<Others<T>>,
}

impl<T> Bucketed<T> {
    /// Number of display slots used, the Others entry included
    pub fn slots(&self) -> usize {
        self.kept.len() + usize::from(self.others.is_some())
    }
}

/// Fold a ranked list into at most `max_items` slots.
///
/// Lists that fit are returned whole. Otherwise the first `max_items - 1`
/// are kept and the rest become one Others entry whose count is the sum of
/// the folded items' counts.
pub fn bucket_others<T>(
    ranked: Vec<T>,
    max_items: usize,
    noun: &str,
    count_of: impl Fn(&T) -> usize,
) -> Bucketed<T> {
    let max_items = max_items.max(1);
    if ranked.len() <= max_items {
        return Bucketed {
            kept: ranked,
            others: None,
        };
    }

    let mut kept = ranked;
    let items = kept.split_off(max_items - 1);
    let count = items.iter().map(&count_of).sum();
    Bucketed {
        kept,
        others: Some(Others {
            label: format!("Others ({} {})", items.len(), noun),
            count,
            items,
        }),
    }
}

/// Occurrence counts for one dimension, in first-encountered order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionCounts {
    pub dimension: Dimension,
    entries: Vec<CountEntry>,
    total: usize,
}

impl DimensionCounts {
    pub fn tally(songs: &[Song], dimension: Dimension) -> Self {
        let mut positions: HashMap<DimensionValue, usize> = HashMap::new();
        let mut entries: Vec<CountEntry> = Vec::new();

        for song in songs {
            let key = song.value_of(dimension);
            match positions.get(&key) {
                Some(&position) => entries[position].count += 1,
                None => {
                    positions.insert(key.clone(), entries.len());
                    entries.push(CountEntry { key, count: 1 });
                }
            }
        }

        Self {
            dimension,
            entries,
            total: songs.len(),
        }
    }

    pub fn entries(&self) -> &[CountEntry] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &DimensionValue) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| &entry.key == key)
            .map(|entry| entry.count)
    }

    /// Count descending; ties keep encounter order (stable sort)
    pub fn ranked(&self) -> Vec<CountEntry> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    pub fn top_n(&self, n: usize) -> Vec<CountEntry> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    pub fn with_others(&self, max_items: usize) -> Bucketed<CountEntry> {
        bucket_others(self.ranked(), max_items, self.dimension.plural(), |entry| entry.count)
    }
}

pub fn count_by(songs: &[Song], dimension: Dimension) -> DimensionCounts {
    DimensionCounts::tally(songs, dimension)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: u16,
    pub count: usize,
}

/// Per-year counts, ascending by year
pub fn year_series(songs: &[Song]) -> Vec<YearCount> {
    let mut counts: BTreeMap<u16, usize> = BTreeMap::new();
    for song in songs {
        *counts.entry(song.year).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}
