use super::counts::{bucket_others, count_by, year_series, CountEntry, DimensionCounts};
use crate::catalog::{decade_label, decade_of, Dimension, Song, SongId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Display budgets for the chart datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLimits {
    pub top_singers: usize,
    pub top_composers: usize,
    pub top_lyricists: usize,
    pub radar_max_singers: usize,
    pub radar_years: usize,
    pub treemap_max_composers: usize,
    pub treemap_max_singers_per_composer: usize,
    pub treemap_other_singers: usize,
    pub bubble_max: usize,
    pub area_max_decades: usize,
}

impl Default for ChartLimits {
    fn default() -> Self {
        Self {
            top_singers: 8,
            top_composers: 8,
            top_lyricists: 8,
            radar_max_singers: 6,
            radar_years: 10,
            treemap_max_composers: 8,
            treemap_max_singers_per_composer: 6,
            treemap_other_singers: 8,
            bubble_max: 40,
            area_max_decades: 5,
        }
    }
}

impl ChartLimits {
    /// Legend size for a person dimension; years are never truncated
    pub fn top_for(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Year => usize::MAX,
            Dimension::Singer => self.top_singers,
            Dimension::Composer => self.top_composers,
            Dimension::Lyricist => self.top_lyricists,
        }
    }
}

fn entry_names(entries: &[CountEntry]) -> Vec<String> {
    entries.iter().map(|entry| entry.key.to_string()).collect()
}

/// Series-per-column table: one row per x value, one value per series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesTable {
    pub series: Vec<String>,
    pub rows: Vec<SeriesRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesRow {
    pub year: u16,
    /// Same order as `SeriesTable::series`
    pub values: Vec<usize>,
}

impl SeriesTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, series: &str) -> Option<Vec<usize>> {
        let position = self.series.iter().position(|name| name == series)?;
        Some(self.rows.iter().map(|row| row.values[position]).collect())
    }
}

/// Per-year song counts for the most frequent singers over the latest `max_years` years.
/// Singers past the budget share one Others series.
pub fn radar(songs: &[Song], max_singers: usize, max_years: usize) -> SeriesTable {
    let years: BTreeSet<u16> = songs.iter().map(|song| song.year).collect();
    let skip = years.len().saturating_sub(max_years);
    let years: Vec<u16> = years.into_iter().skip(skip).collect();

    let bucketed = count_by(songs, Dimension::Singer).with_others(max_singers);
    let mut groups: Vec<HashSet<String>> = bucketed
        .kept
        .iter()
        .map(|entry| HashSet::from([entry.key.to_string()]))
        .collect();
    let mut series = entry_names(&bucketed.kept);
    if let Some(others) = &bucketed.others {
        groups.push(entry_names(&others.items).into_iter().collect());
        series.push(others.label.clone());
    }

    let rows = years
        .into_iter()
        .map(|year| SeriesRow {
            year,
            values: groups
                .iter()
                .map(|group| {
                    songs
                        .iter()
                        .filter(|song| song.year == year && group.contains(&song.singer))
                        .count()
                })
                .collect(),
        })
        .collect();

    SeriesTable { series, rows }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreemapNode {
    pub name: String,
    pub value: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_others: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreemapNode>,
    /// Names folded into an Others node, for the expansion view
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub folded: Vec<String>,
}

impl TreemapNode {
    fn leaf(entry: &CountEntry) -> Self {
        Self {
            name: entry.key.to_string(),
            value: entry.count,
            is_others: false,
            children: Vec::new(),
            folded: Vec::new(),
        }
    }
}

fn singer_nodes(counts: &DimensionCounts, max_items: usize) -> Vec<TreemapNode> {
    let bucketed = counts.with_others(max_items);
    let mut nodes: Vec<TreemapNode> = bucketed.kept.iter().map(TreemapNode::leaf).collect();
    if let Some(others) = bucketed.others {
        nodes.push(TreemapNode {
            name: others.label,
            value: others.count,
            is_others: true,
            children: Vec::new(),
            folded: entry_names(&others.items),
        });
    }
    nodes
}

/// Composer -> singer blocks. Composers past the budget merge into one
/// "Other Composers" block whose singers are pooled across them.
pub fn treemap(songs: &[Song], limits: &ChartLimits) -> Vec<TreemapNode> {
    let composers = bucket_others(
        count_by(songs, Dimension::Composer).ranked(),
        limits.treemap_max_composers,
        Dimension::Composer.plural(),
        |entry| entry.count,
    );

    let singers_of = |names: &HashSet<String>| {
        let subset: Vec<Song> = songs
            .iter()
            .filter(|song| names.contains(&song.composer))
            .cloned()
            .collect();
        count_by(&subset, Dimension::Singer)
    };

    let mut nodes: Vec<TreemapNode> = composers
        .kept
        .iter()
        .map(|composer| {
            let name = composer.key.to_string();
            let singers = singers_of(&HashSet::from([name.clone()]));
            TreemapNode {
                children: singer_nodes(&singers, limits.treemap_max_singers_per_composer),
                ..TreemapNode::leaf(composer)
            }
        })
        .collect();

    if let Some(others) = composers.others {
        let folded = entry_names(&others.items);
        let singers = singers_of(&folded.iter().cloned().collect());
        nodes.push(TreemapNode {
            name: format!("Other Composers ({})", folded.len()),
            value: others.count,
            is_others: true,
            children: singer_nodes(&singers, limits.treemap_other_singers),
            folded,
        });
    }

    nodes
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bubble {
    /// Horizontal position; an Others bubble sits mid-decade
    pub year: u16,
    pub decade: u16,
    pub label: String,
    pub movie: String,
    pub singer: String,
    pub composer: String,
    pub song: Option<SongId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub folded: Vec<SongId>,
}

impl Bubble {
    fn for_song(song: &Song) -> Self {
        Self {
            year: song.year,
            decade: song.decade(),
            label: song.song.clone(),
            movie: song.movie.clone(),
            singer: song.singer.clone(),
            composer: song.composer.clone(),
            song: Some(song.id),
            folded: Vec::new(),
        }
    }

    fn others(decade: u16, folded: Vec<SongId>) -> Self {
        Self {
            year: decade + 5,
            decade,
            label: format!("Others ({} songs)", folded.len()),
            movie: decade_label(decade),
            singer: "Various Artists".to_string(),
            composer: "Various Composers".to_string(),
            song: None,
            folded,
        }
    }

    pub fn is_others(&self) -> bool {
        self.song.is_none()
    }
}

/// One bubble per song while under `max_bubbles`; otherwise the budget is
/// split evenly across decades and each overflowing decade keeps its first
/// songs plus one Others bubble.
pub fn bubbles(songs: &[Song], max_bubbles: usize) -> Vec<Bubble> {
    if songs.len() <= max_bubbles {
        return songs.iter().map(Bubble::for_song).collect();
    }

    let mut decades: BTreeMap<u16, Vec<&Song>> = BTreeMap::new();
    for song in songs {
        decades.entry(song.decade()).or_default().push(song);
    }
    let per_decade = (max_bubbles / decades.len()).max(1);

    let mut result = Vec::new();
    for (decade, members) in decades {
        if members.len() <= per_decade {
            result.extend(members.into_iter().map(Bubble::for_song));
            continue;
        }
        let (top, rest) = members.split_at(per_decade - 1);
        result.extend(top.iter().copied().map(Bubble::for_song));
        result.push(Bubble::others(decade, rest.iter().map(|song| song.id).collect()));
    }
    result
}

/// Per-year counts split by decade, for the most active decades plus an
/// Others series. Rows ascend by year.
pub fn area(songs: &[Song], max_decades: usize) -> SeriesTable {
    let mut totals: BTreeMap<u16, usize> = BTreeMap::new();
    for song in songs {
        *totals.entry(song.decade()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(u16, usize)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let bucketed = bucket_others(ranked, max_decades, "decades", |(_, count)| *count);
    let mut series: Vec<String> = bucketed
        .kept
        .iter()
        .map(|(decade, _)| decade_label(*decade))
        .collect();
    let mut columns: Vec<HashSet<u16>> = bucketed
        .kept
        .iter()
        .map(|(decade, _)| HashSet::from([*decade]))
        .collect();
    if let Some(others) = bucketed.others {
        series.push(others.label);
        columns.push(others.items.iter().map(|(decade, _)| *decade).collect());
    }

    let rows = year_series(songs)
        .into_iter()
        .map(|point| SeriesRow {
            year: point.year,
            values: columns
                .iter()
                .map(|decades| {
                    if decades.contains(&decade_of(point.year)) {
                        point.count
                    } else {
                        0
                    }
                })
                .collect(),
        })
        .collect();

    SeriesTable { series, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::song::fixtures::{five_songs, song};

    fn spread(count: u64, decade_of_song: impl Fn(u64) -> u16, singer_of: impl Fn(u64) -> String) -> Vec<Song> {
        (1..=count)
            .map(|id| {
                let singer = singer_of(id);
                song(id, &format!("Song {}", id), decade_of_song(id), "A", &singer, "L")
            })
            .collect()
    }

    #[test]
    fn test_radar_latest_years_and_others() {
        let songs = spread(
            30,
            |id| 1970 + (id % 15) as u16,
            |id| format!("S{}", id % 8),
        );
        let chart = radar(&songs, 6, 10);
        assert_eq!(chart.rows.len(), 10);
        assert_eq!(chart.rows.first().unwrap().year, 1975);
        assert_eq!(chart.rows.last().unwrap().year, 1984);
        assert_eq!(chart.series.len(), 6);
        assert_eq!(chart.series[5], "Others (3 singers)");

        // every song in the kept years lands in exactly one column
        let in_window = songs.iter().filter(|s| s.year >= 1975).count();
        let plotted: usize = chart.rows.iter().flat_map(|r| r.values.iter()).sum();
        assert_eq!(plotted, in_window);
    }

    #[test]
    fn test_radar_small_input_has_no_others() {
        let chart = radar(&five_songs(), 6, 10);
        assert_eq!(chart.series, vec!["X", "Y", "Z"]);
        assert_eq!(chart.column("X"), Some(vec![1, 1, 1]));
    }

    #[test]
    fn test_exactly_max_series_are_all_kept() {
        let chart = radar(&five_songs(), 3, 10);
        assert_eq!(chart.series, vec!["X", "Y", "Z"]);
        let chart = radar(&five_songs(), 2, 10);
        assert_eq!(chart.series, vec!["X", "Others (2 singers)"]);

        let chart = area(&five_songs(), 3);
        assert_eq!(chart.series, vec!["1960s", "1990s", "1970s"]);
        let chart = area(&five_songs(), 2);
        assert_eq!(chart.series, vec!["1960s", "Others (2 decades)"]);
    }

    #[test]
    fn test_treemap_buckets_composers_and_singers() {
        let mut songs = Vec::new();
        let mut id = 0;
        for (composer, singers) in [("A", 5), ("B", 4), ("C", 3), ("D", 2), ("E", 1)] {
            for s in 0..singers {
                id += 1;
                songs.push(song(id, "t", 1980, composer, &format!("S{}", s), "L"));
            }
        }
        let limits = ChartLimits {
            treemap_max_composers: 3,
            treemap_max_singers_per_composer: 3,
            treemap_other_singers: 2,
            ..ChartLimits::default()
        };
        let nodes = treemap(&songs, &limits);
        assert_eq!(nodes.len(), 3);

        let a = &nodes[0];
        assert_eq!((a.name.as_str(), a.value), ("A", 5));
        assert_eq!(a.children.len(), 3);
        assert!(a.children[2].is_others);
        assert_eq!(a.children[2].value, 3);
        assert_eq!(a.children.iter().map(|c| c.value).sum::<usize>(), a.value);

        let others = &nodes[2];
        assert!(others.is_others);
        assert_eq!(others.name, "Other Composers (3)");
        assert_eq!(others.value, 6);
        assert_eq!(others.folded, vec!["C", "D", "E"]);
        assert_eq!(others.children.iter().map(|c| c.value).sum::<usize>(), 6);
    }

    #[test]
    fn test_bubbles_under_budget_one_per_song() {
        let result = bubbles(&five_songs(), 40);
        assert_eq!(result.len(), 5);
        assert!(result.iter().all(|b| !b.is_others()));
    }

    #[test]
    fn test_bubbles_fold_per_decade() {
        // 8 songs in the 1960s, 2 in the 1990s, budget 6 -> 3 per decade
        let songs = spread(10, |id| if id <= 8 { 1960 + id as u16 } else { 1990 }, |_| "X".into());
        let result = bubbles(&songs, 6);
        assert_eq!(result.len(), 5);

        let others: Vec<&Bubble> = result.iter().filter(|b| b.is_others()).collect();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].year, 1965);
        assert_eq!(others[0].label, "Others (6 songs)");
        assert_eq!(others[0].folded.first(), Some(&SongId(3)));
        assert_eq!(result.iter().filter(|b| b.decade == 1990).count(), 2);
    }

    #[test]
    fn test_area_decade_columns() {
        let songs = spread(
            12,
            |id| match id {
                1..=4 => 1965,
                5..=7 => 1975,
                8..=9 => 1985,
                10 => 1995,
                _ => 2005,
            },
            |_| "X".into(),
        );
        let chart = area(&songs, 3);
        assert_eq!(chart.series, vec!["1960s", "1970s", "Others (3 decades)"]);
        assert_eq!(chart.rows.len(), 5);
        assert_eq!(chart.column("1960s"), Some(vec![4, 0, 0, 0, 0]));
        assert_eq!(chart.column("Others (3 decades)"), Some(vec![0, 0, 2, 1, 2]));
    }

    #[test]
    fn test_empty_inputs() {
        let limits = ChartLimits::default();
        assert!(radar(&[], 6, 10).is_empty());
        assert!(treemap(&[], &limits).is_empty());
        assert!(bubbles(&[], 40).is_empty());
        assert!(area(&[], 5).is_empty());
    }
}
