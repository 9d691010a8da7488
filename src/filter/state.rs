use crate::catalog::{decade_of, Dimension, DimensionValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive year window. Construction normalises the bounds so `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawYearRange")]
pub struct YearRange {
    lo: u16,
    hi: u16,
}

// Deserialized bounds go through `YearRange::new` too
#[derive(Deserialize)]
struct RawYearRange {
    lo: u16,
    hi: u16,
}

impl From<RawYearRange> for YearRange {
    fn from(raw: RawYearRange) -> Self {
        YearRange::new(raw.lo, raw.hi)
    }
}

impl YearRange {
    pub fn new(from: u16, to: u16) -> Self {
        Self {
            lo: from.min(to),
            hi: from.max(to),
        }
    }

    /// The ten years of the decade containing `year`
    pub fn decade(year: u16) -> Self {
        let start = decade_of(year);
        Self::new(start, start.saturating_add(9))
    }

    pub fn lo(&self) -> u16 {
        self.lo
    }

    pub fn hi(&self) -> u16 {
        self.hi
    }

    pub fn contains(&self, year: u16) -> bool {
        (self.lo..=self.hi).contains(&year)
    }

    pub fn is_single_year(&self) -> bool {
        self.lo == self.hi
    }
}

/// Single-value filters set by clicking chart segments.
///
/// Each dimension is independent, except `year` and `year_range` which
/// exclude each other: setting one clears the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartFilter {
    year: Option<u16>,
    singer: Option<String>,
    composer: Option<String>,
    lyricist: Option<String>,
    year_range: Option<YearRange>,
}

impl ChartFilter {
    pub fn year(&self) -> Option<u16> {
        self.year
    }

    pub fn year_range(&self) -> Option<YearRange> {
        self.year_range
    }

    pub fn name(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Year => None,
            Dimension::Singer => self.singer.as_deref(),
            Dimension::Composer => self.composer.as_deref(),
            Dimension::Lyricist => self.lyricist.as_deref(),
        }
    }

    /// Current single-value selection for a dimension
    pub fn get(&self, dimension: Dimension) -> Option<DimensionValue> {
        match dimension {
            Dimension::Year => self.year.map(DimensionValue::Year),
            Dimension::Singer => self.singer.clone().map(DimensionValue::Singer),
            Dimension::Composer => self.composer.clone().map(DimensionValue::Composer),
            Dimension::Lyricist => self.lyricist.clone().map(DimensionValue::Lyricist),
        }
    }

    pub fn is_set(&self, value: &DimensionValue) -> bool {
        self.get(value.dimension()).as_ref() == Some(value)
    }

    pub fn set(&mut self, value: DimensionValue) {
        match value {
            DimensionValue::Year(year) => {
                self.year = Some(year);
                self.year_range = None;
            }
            DimensionValue::Singer(name) => self.singer = Some(name),
            DimensionValue::Composer(name) => self.composer = Some(name),
            DimensionValue::Lyricist(name) => self.lyricist = Some(name),
        }
    }

    pub fn clear(&mut self, dimension: Dimension) {
        match dimension {
            Dimension::Year => self.year = None,
            Dimension::Singer => self.singer = None,
            Dimension::Composer => self.composer = None,
            Dimension::Lyricist => self.lyricist = None,
        }
    }

    pub fn set_year_range(&mut self, range: YearRange) {
        self.year_range = Some(range);
        self.year = None;
    }

    pub fn clear_year_range(&mut self) {
        self.year_range = None;
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn active_count(&self) -> usize {
        [
            self.year.is_some(),
            self.singer.is_some(),
            self.composer.is_some(),
            self.lyricist.is_some(),
            self.year_range.is_some(),
        ]
        .iter()
        .filter(|&&set| set)
        .count()
    }
}

/// Every active filter criterion. The default value filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Raw search text, tokenised at evaluation time
    pub search_term: String,
    pub selected_years: BTreeSet<u16>,
    pub selected_composers: BTreeSet<String>,
    pub selected_singers: BTreeSet<String>,
    pub selected_lyricists: BTreeSet<String>,
    pub chart: ChartFilter,
}

impl FilterState {
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    fn names(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        match dimension {
            Dimension::Year => None,
            Dimension::Singer => Some(&self.selected_singers),
            Dimension::Composer => Some(&self.selected_composers),
            Dimension::Lyricist => Some(&self.selected_lyricists),
        }
    }

    fn names_mut(&mut self, dimension: Dimension) -> Option<&mut BTreeSet<String>> {
        match dimension {
            Dimension::Year => None,
            Dimension::Singer => Some(&mut self.selected_singers),
            Dimension::Composer => Some(&mut self.selected_composers),
            Dimension::Lyricist => Some(&mut self.selected_lyricists),
        }
    }

    pub fn selected_count(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Year => self.selected_years.len(),
            _ => self.names(dimension).map_or(0, BTreeSet::len),
        }
    }

    pub fn is_selected(&self, value: &DimensionValue) -> bool {
        match value {
            DimensionValue::Year(year) => self.selected_years.contains(year),
            DimensionValue::Singer(name)
            | DimensionValue::Composer(name)
            | DimensionValue::Lyricist(name) => self
                .names(value.dimension())
                .is_some_and(|names| names.contains(name)),
        }
    }

    /// Checkbox toggle on a multi-select list. Returns whether the value is now selected.
    pub fn toggle_selected(&mut self, value: DimensionValue) -> bool {
        let dimension = value.dimension();
        match value {
            DimensionValue::Year(year) => {
                if !self.selected_years.remove(&year) {
                    self.selected_years.insert(year);
                    return true;
                }
                false
            }
            DimensionValue::Singer(name)
            | DimensionValue::Composer(name)
            | DimensionValue::Lyricist(name) => match self.names_mut(dimension) {
                Some(names) => {
                    if names.remove(&name) {
                        false
                    } else {
                        names.insert(name);
                        true
                    }
                }
                None => false,
            },
        }
    }

    pub fn clear_selected(&mut self, dimension: Dimension) {
        match dimension {
            Dimension::Year => self.selected_years.clear(),
            _ => {
                if let Some(names) = self.names_mut(dimension) {
                    names.clear();
                }
            }
        }
    }

    /// Decade button of the year picker: deselect the whole decade when all of
    /// its years are selected, otherwise select all of them.
    pub fn toggle_decade(&mut self, years: &[u16]) {
        if years.is_empty() {
            return;
        }
        let all_selected = years.iter().all(|year| self.selected_years.contains(year));
        if all_selected {
            for year in years {
                self.selected_years.remove(year);
            }
        } else {
            self.selected_years.extend(years.iter().copied());
        }
    }

    pub fn has_search(&self) -> bool {
        !self.search_term.trim().is_empty()
    }

    pub fn is_unfiltered(&self) -> bool {
        self.active_filter_count() == 0
    }

    pub fn active_filter_count(&self) -> usize {
        usize::from(self.has_search())
            + Dimension::ALL
                .iter()
                .map(|&dimension| self.selected_count(dimension))
                .sum::<usize>()
            + self.chart.active_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range_normalises_bounds() {
        let range = YearRange::new(1999, 1965);
        assert_eq!((range.lo(), range.hi()), (1965, 1999));
        assert!(range.contains(1965) && range.contains(1999) && range.contains(1978));
        assert!(!range.contains(2000));
        assert!(YearRange::new(1980, 1980).is_single_year());
        assert_eq!(YearRange::decade(1987), YearRange::new(1980, 1989));
    }

    #[test]
    fn test_decade_at_top_of_range() {
        assert_eq!(YearRange::decade(u16::MAX), YearRange::new(65530, u16::MAX));
        assert!(YearRange::decade(65531).contains(65535));
    }

    #[test]
    fn test_deserialized_range_is_normalised() {
        let range: YearRange = serde_json::from_str(r#"{"lo":1990,"hi":1970}"#).unwrap();
        assert_eq!(range, YearRange::new(1970, 1990));
        assert!(range.contains(1980));
        assert_eq!(serde_json::to_string(&range).unwrap(), r#"{"lo":1970,"hi":1990}"#);
    }

    #[test]
    fn test_year_and_range_exclude_each_other() {
        let mut chart = ChartFilter::default();
        chart.set(DimensionValue::Year(1978));
        chart.set_year_range(YearRange::new(1960, 1969));
        assert_eq!(chart.year(), None);
        assert_eq!(chart.year_range(), Some(YearRange::new(1960, 1969)));

        chart.set(DimensionValue::Year(1999));
        assert_eq!(chart.year(), Some(1999));
        assert_eq!(chart.year_range(), None);
    }

    #[test]
    fn test_chart_dimensions_are_independent() {
        let mut chart = ChartFilter::default();
        chart.set(DimensionValue::Singer("X".into()));
        chart.set(DimensionValue::Composer("A".into()));
        chart.clear(Dimension::Singer);
        assert_eq!(chart.name(Dimension::Singer), None);
        assert_eq!(chart.name(Dimension::Composer), Some("A"));
        assert_eq!(chart.active_count(), 1);
    }

    #[test]
    fn test_toggle_selected_adds_then_removes() {
        let mut state = FilterState::default();
        assert!(state.toggle_selected(DimensionValue::Singer("X".into())));
        assert!(state.is_selected(&DimensionValue::Singer("X".into())));
        assert!(!state.toggle_selected(DimensionValue::Singer("X".into())));
        assert!(state.selected_singers.is_empty());

        assert!(state.toggle_selected(DimensionValue::Year(1999)));
        assert_eq!(state.selected_count(Dimension::Year), 1);
    }

    #[test]
    fn test_toggle_decade() {
        let mut state = FilterState::default();
        state.selected_years.insert(1981);

        // partially selected -> select all
        state.toggle_decade(&[1980, 1981, 1985]);
        assert_eq!(state.selected_years.len(), 3);

        // fully selected -> deselect all
        state.toggle_decade(&[1980, 1981, 1985]);
        assert!(state.selected_years.is_empty());
    }

    #[test]
    fn test_active_filter_count() {
        let mut state = FilterState::default();
        assert!(state.is_unfiltered());

        state.set_search_term("   ");
        assert!(state.is_unfiltered());

        state.set_search_term("raja");
        state.toggle_selected(DimensionValue::Composer("A".into()));
        state.chart.set(DimensionValue::Lyricist("L1".into()));
        assert_eq!(state.active_filter_count(), 3);

        state.clear_selected(Dimension::Composer);
        assert_eq!(state.active_filter_count(), 2);
    }
}
