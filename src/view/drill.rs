use crate::aggregate::AggregateNode;
use crate::catalog::Dimension;
use crate::filter::YearRange;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrillError {
    #[error("cannot zoom into the root; use zoom out instead")]
    EmptyPath,

    #[error("no node at '{0}'")]
    UnknownNode(String),

    #[error("'{to}' is not below the current node '{from}'")]
    NotDescendant { from: String, to: String },
}

fn join(path: &[String]) -> String {
    path.join(" / ")
}

/// Zoom state of a hierarchical chart.
///
/// `Overview -> Drilled(path)` on zoom, `Drilled(p) -> Drilled(q)` only when `q`
/// is strictly below `p`, and back to `Overview` on zoom out or reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "path", rename_all = "lowercase")]
pub enum DrillState {
    #[default]
    Overview,
    Drilled(Vec<String>),
}

impl DrillState {
    pub fn path(&self) -> &[String] {
        match self {
            DrillState::Overview => &[],
            DrillState::Drilled(path) => path,
        }
    }

    pub fn is_overview(&self) -> bool {
        matches!(self, DrillState::Overview)
    }

    /// Zoom into the node at `path` of `tree`
    pub fn zoom_into(&mut self, tree: &AggregateNode, path: &[String]) -> Result<(), DrillError> {
        if path.is_empty() {
            return Err(DrillError::EmptyPath);
        }
        if tree.find(path).is_none() {
            return Err(DrillError::UnknownNode(join(path)));
        }
        if let DrillState::Drilled(current) = &*self {
            let below = path.len() > current.len() && path.starts_with(current);
            if !below {
                return Err(DrillError::NotDescendant {
                    from: join(current),
                    to: join(path),
                });
            }
        }
        debug!("Drilled into {}", join(path));
        *self = DrillState::Drilled(path.to_vec());
        Ok(())
    }

    /// Centre click
    pub fn zoom_out(&mut self) {
        *self = DrillState::Overview;
    }

    /// Fall back to the overview when the drilled node is gone from `tree`
    pub fn prune(&mut self, tree: &AggregateNode) -> bool {
        if let DrillState::Drilled(path) = &*self {
            if tree.find(path).is_none() {
                debug!("{} left the tree, back to overview", join(path));
                *self = DrillState::Overview;
                return true;
            }
        }
        false
    }

    /// The node currently in focus; falls back to the root when the drilled
    /// node has disappeared from a re-derived tree
    pub fn focus<'a>(&self, tree: &'a AggregateNode) -> &'a AggregateNode {
        tree.find(self.path()).unwrap_or(tree)
    }
}

/// Expanded "Others" list of a chart, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OthersExpansion {
    pub expanded: Option<ExpandedOthers>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedOthers {
    pub label: String,
    pub items: Vec<String>,
}

impl OthersExpansion {
    pub fn open(&mut self, label: impl Into<String>, items: Vec<String>) {
        self.expanded = Some(ExpandedOthers {
            label: label.into(),
            items,
        });
    }

    pub fn close(&mut self) {
        self.expanded = None;
    }

    pub fn is_open(&self) -> bool {
        self.expanded.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchaeologyTab {
    #[default]
    Collaborations,
    Composers,
    Singers,
    Lyricists,
}

impl ArchaeologyTab {
    /// Artist role listed on the tab; `None` for collaborations
    pub fn role(self) -> Option<Dimension> {
        match self {
            ArchaeologyTab::Collaborations => None,
            ArchaeologyTab::Composers => Some(Dimension::Composer),
            ArchaeologyTab::Singers => Some(Dimension::Singer),
            ArchaeologyTab::Lyricists => Some(Dimension::Lyricist),
        }
    }
}

/// Collaboration explorer: tab, year window and highlighted artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchaeologyState {
    pub tab: ArchaeologyTab,
    pub year_window: YearRange,
    pub highlighted: Option<String>,
    pub drill: DrillState,
}

impl ArchaeologyState {
    pub fn new(year_window: YearRange) -> Self {
        Self {
            tab: ArchaeologyTab::default(),
            year_window,
            highlighted: None,
            drill: DrillState::default(),
        }
    }

    pub fn set_tab(&mut self, tab: ArchaeologyTab) {
        self.tab = tab;
        self.highlighted = None;
    }

    pub fn highlight(&mut self, artist: Option<String>) {
        self.highlighted = artist;
    }
}
