use crate::catalog::{decade_label, Dimension, DimensionValue, Song, SongId};
use crate::filter::ChartEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ROOT_NAME: &str = "All Songs";

/// Level order below the decade ring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeOrder {
    /// decade -> lyricist -> composer -> singer (catalog sunburst)
    #[default]
    LyricistComposerSinger,
    /// decade -> composer -> singer -> lyricist (collaboration sunburst)
    ComposerSingerLyricist,
}

impl TreeOrder {
    /// Dimensions for depths 2, 3 and 4
    pub fn levels(self) -> [Dimension; 3] {
        match self {
            TreeOrder::LyricistComposerSinger => {
                [Dimension::Lyricist, Dimension::Composer, Dimension::Singer]
            }
            TreeOrder::ComposerSingerLyricist => {
                [Dimension::Composer, Dimension::Singer, Dimension::Lyricist]
            }
        }
    }

    /// Dimension shown at `depth` (1 = decade ring, which is a year dimension)
    pub fn dimension_at(self, depth: usize) -> Option<Dimension> {
        match depth {
            1 => Some(Dimension::Year),
            2..=4 => Some(self.levels()[depth - 2]),
            _ => None,
        }
    }

    /// The chart event a click on the node at `path` emits.
    /// Decade nodes emit a decade click; deeper nodes a single-value select.
    pub fn click_event<S: AsRef<str>>(self, path: &[S]) -> Option<ChartEvent> {
        let name = path.last()?.as_ref();
        match self.dimension_at(path.len())? {
            Dimension::Year => parse_decade_label(name).map(|decade| ChartEvent::Decade { decade }),
            dimension => DimensionValue::parse(dimension, name).map(|value| ChartEvent::Select { value }),
        }
    }
}

impl std::str::FromStr for TreeOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lyricist" | "lyricist-composer-singer" => Ok(TreeOrder::LyricistComposerSinger),
            "composer" | "composer-singer-lyricist" => Ok(TreeOrder::ComposerSingerLyricist),
            other => Err(format!("unknown tree order '{}'", other)),
        }
    }
}

/// "1980s" -> 1980
pub fn parse_decade_label(label: &str) -> Option<u16> {
    label.strip_suffix('s')?.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateNode {
    pub name: String,
    /// Song count under this node
    pub value: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AggregateNode>,
    /// Contributing songs, filled on leaves only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub songs: Vec<SongId>,
}

impl AggregateNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&AggregateNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Walk down by child names; an empty path returns `self`
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&AggregateNode> {
        path.iter()
            .try_fold(self, |node, name| node.child(name.as_ref()))
    }

    /// Every parent's value equals the sum of its children's values
    pub fn is_sum_consistent(&self) -> bool {
        if self.is_leaf() {
            return self.songs.is_empty() || self.songs.len() == self.value;
        }
        let sum: usize = self.children.iter().map(|child| child.value).sum();
        sum == self.value && self.children.iter().all(AggregateNode::is_sum_consistent)
    }

    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// All song ids under this node, leaf order
    pub fn song_ids(&self) -> Vec<SongId> {
        if self.is_leaf() {
            return self.songs.clone();
        }
        self.children.iter().flat_map(AggregateNode::song_ids).collect()
    }
}

/// Mutable node used while inserting; children indexed by name
#[derive(Default)]
struct NodeBuilder {
    value: usize,
    index: HashMap<String, usize>,
    children: Vec<(String, NodeBuilder)>,
    songs: Vec<SongId>,
}

impl NodeBuilder {
    fn insert(&mut self, path: &[String], id: SongId) {
        self.value += 1;
        let Some((head, rest)) = path.split_first() else {
            self.songs.push(id);
            return;
        };
        let position = match self.index.get(head) {
            Some(&position) => position,
            None => {
                self.index.insert(head.clone(), self.children.len());
                self.children.push((head.clone(), NodeBuilder::default()));
                self.children.len() - 1
            }
        };
        self.children[position].1.insert(rest, id);
    }

    fn finish(self, name: String) -> AggregateNode {
        let mut children = self.children;
        // stable: equal counts keep insertion order
        children.sort_by(|a, b| b.1.value.cmp(&a.1.value));
        AggregateNode {
            name,
            value: self.value,
            children: children
                .into_iter()
                .map(|(name, builder)| builder.finish(name))
                .collect(),
            songs: self.songs,
        }
    }
}

/// Four-level decade tree over `songs`, built in one pass.
///
/// Decades are sorted chronologically; every other level by count descending
/// with ties in first-encountered order.
pub fn build_tree(songs: &[Song], order: TreeOrder) -> AggregateNode {
    let levels = order.levels();
    let mut decades: Vec<(u16, NodeBuilder)> = Vec::new();
    let mut decade_index: HashMap<u16, usize> = HashMap::new();

    for song in songs {
        let decade = song.decade();
        let position = *decade_index.entry(decade).or_insert_with(|| {
            decades.push((decade, NodeBuilder::default()));
            decades.len() - 1
        });
        let path: Vec<String> = levels
            .iter()
            .map(|&dimension| song.name_of(dimension).unwrap_or_default().to_string())
            .collect();
        decades[position].1.insert(&path, song.id);
    }

    decades.sort_by_key(|(decade, _)| *decade);
    let children: Vec<AggregateNode> = decades
        .into_iter()
        .map(|(decade, builder)| builder.finish(decade_label(decade)))
        .collect();

    AggregateNode {
        name: ROOT_NAME.to_string(),
        value: children.iter().map(|child| child.value).sum(),
        children,
        songs: Vec::new(),
    }
}
