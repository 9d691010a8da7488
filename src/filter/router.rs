use super::state::{FilterState, YearRange};
use crate::catalog::{decade_label, DimensionValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a chart reports back when the user interacts with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartEvent {
    /// Click on a segment for a year, singer, composer or lyricist
    Select { value: DimensionValue },
    /// Pointer over a segment; has no effect on filters
    Hover { value: DimensionValue },
    /// Brushed year span on a time axis; bounds may arrive in either order
    Brush { from: u16, to: u16 },
    /// Click on a decade ring segment
    Decade { decade: u16 },
}

/// Select-if-unset, clear-if-current for one chart-click dimension.
pub fn toggle_dimension_filter(state: &FilterState, value: DimensionValue) -> FilterState {
    let mut next = state.clone();
    if next.chart.is_set(&value) {
        debug!("Chart filter {} cleared (was {})", value.dimension(), value);
        next.chart.clear(value.dimension());
    } else {
        debug!("Chart filter {} set to {}", value.dimension(), value);
        next.chart.set(value);
    }
    next
}

/// Range counterpart of [`toggle_dimension_filter`]. A range collapsing to one
/// year is routed through the single-year toggle instead.
pub fn toggle_year_range(state: &FilterState, from: u16, to: u16) -> FilterState {
    let range = YearRange::new(from, to);
    if range.is_single_year() {
        return toggle_dimension_filter(state, DimensionValue::Year(range.lo()));
    }

    let mut next = state.clone();
    if next.chart.year_range() == Some(range) {
        debug!("Year range {}-{} cleared", range.lo(), range.hi());
        next.chart.clear_year_range();
    } else {
        debug!("Year range set to {}-{}", range.lo(), range.hi());
        next.chart.set_year_range(range);
    }
    next
}

/// Apply one chart event to the filter state. Hovers return the state unchanged.
pub fn route(state: &FilterState, event: &ChartEvent) -> FilterState {
    match event {
        ChartEvent::Select { value } => toggle_dimension_filter(state, value.clone()),
        ChartEvent::Hover { .. } => state.clone(),
        ChartEvent::Brush { from, to } => toggle_year_range(state, *from, *to),
        ChartEvent::Decade { decade } => {
            let range = YearRange::decade(*decade);
            debug!("Decade {} clicked", decade_label(range.lo()));
            toggle_year_range(state, range.lo(), range.hi())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Dimension;

    fn singer(name: &str) -> DimensionValue {
        DimensionValue::Singer(name.to_string())
    }

    #[test]
    fn test_toggle_twice_restores_value() {
        let start = FilterState::default();
        let once = toggle_dimension_filter(&start, singer("X"));
        assert_eq!(once.chart.name(Dimension::Singer), Some("X"));
        let twice = toggle_dimension_filter(&once, singer("X"));
        assert_eq!(twice.chart.name(Dimension::Singer), None);
        assert_eq!(twice, start);
    }

    #[test]
    fn test_toggle_other_value_replaces() {
        let state = toggle_dimension_filter(&FilterState::default(), singer("X"));
        let state = toggle_dimension_filter(&state, singer("Y"));
        assert_eq!(state.chart.name(Dimension::Singer), Some("Y"));
    }

    #[test]
    fn test_toggle_symmetry_for_every_dimension() {
        let mut base = FilterState::default();
        base.set_search_term("nila");
        base.chart.set(DimensionValue::Lyricist("Existing".into()));
        let values = [
            DimensionValue::Year(1978),
            singer("X"),
            DimensionValue::Composer("A".into()),
            // already the current value: deselect then reselect
            DimensionValue::Lyricist("Existing".into()),
        ];
        for value in values {
            let dimension = value.dimension();
            let back = toggle_dimension_filter(&toggle_dimension_filter(&base, value.clone()), value);
            assert_eq!(back.chart.get(dimension), base.chart.get(dimension));
        }
    }

    #[test]
    fn test_pure_reducer() {
        let mut state = FilterState::default();
        state.set_search_term("raja");
        let a = toggle_dimension_filter(&state, DimensionValue::Year(1999));
        let b = toggle_dimension_filter(&state, DimensionValue::Year(1999));
        assert_eq!(a, b);
        assert_eq!(state.chart.year(), None);
    }

    #[test]
    fn test_brush_sets_range_and_clears_year() {
        let state = toggle_dimension_filter(&FilterState::default(), DimensionValue::Year(1978));
        let state = route(&state, &ChartEvent::Brush { from: 1990, to: 1970 });
        assert_eq!(state.chart.year(), None);
        assert_eq!(state.chart.year_range(), Some(YearRange::new(1970, 1990)));

        // same brush again clears it
        let state = route(&state, &ChartEvent::Brush { from: 1970, to: 1990 });
        assert_eq!(state.chart.year_range(), None);
    }

    #[test]
    fn test_single_year_brush_routes_to_year_toggle() {
        let mut state = FilterState::default();
        state.chart.set_year_range(YearRange::new(1960, 1969));

        let state = route(&state, &ChartEvent::Brush { from: 1965, to: 1965 });
        assert_eq!(state.chart.year(), Some(1965));
        assert_eq!(state.chart.year_range(), None);

        let state = route(&state, &ChartEvent::Brush { from: 1965, to: 1965 });
        assert_eq!(state.chart.year(), None);
    }

    #[test]
    fn test_decade_click_toggles_decade_range() {
        let state = route(&FilterState::default(), &ChartEvent::Decade { decade: 1980 });
        assert_eq!(state.chart.year_range(), Some(YearRange::new(1980, 1989)));
        let state = route(&state, &ChartEvent::Decade { decade: 1980 });
        assert!(state.chart.is_empty());
    }

    #[test]
    fn test_decade_near_u16_max_stays_in_range() {
        let state = route(&FilterState::default(), &ChartEvent::Decade { decade: u16::MAX });
        assert_eq!(state.chart.year_range(), Some(YearRange::new(65530, u16::MAX)));
        let state = route(&state, &ChartEvent::Decade { decade: 65530 });
        assert!(state.chart.is_empty());
    }

    #[test]
    fn test_hover_is_ignored() {
        let state = toggle_dimension_filter(&FilterState::default(), singer("X"));
        let after = route(&state, &ChartEvent::Hover { value: singer("Y") });
        assert_eq!(after, state);
    }

    #[test]
    fn test_event_json_shape() {
        let event: ChartEvent = serde_json::from_str(
            r#"{"kind":"select","value":{"dimension":"singer","value":"X"}}"#,
        )
        .unwrap();
        assert_eq!(event, ChartEvent::Select { value: singer("X") });
    }
}
