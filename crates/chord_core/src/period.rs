use chrono::{Datelike, NaiveDate};

use crate::dataset::ModeData;

/// Display label for a period key: `"2020-04"` or `"2020-06-30"` become `"2020-Q2"`.
///
/// Keys that do not parse as a year-month are shown verbatim.
pub fn period_label(key: &str) -> String {
    let key = key.trim();
    if key.is_empty() {
        return String::new();
    }

    parse_period(key).map_or_else(
        || key.to_string(),
        |date| format!("{}-Q{}", date.year(), quarter_of(date.month())),
    )
}

pub const fn quarter_of(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

fn parse_period(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d"))
        .ok()
}

/// Inclusive slider range for a mode's periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderBounds {
    pub min: usize,
    pub max: usize,
}

impl SliderBounds {
    pub const fn for_mode(mode: &ModeData) -> Self {
        Self {
            min: 0,
            max: mode.dates.len().saturating_sub(1),
        }
    }

    pub fn clamp(self, index: usize) -> usize {
        index.clamp(self.min, self.max)
    }

    /// Moves `index` by `delta` without leaving the range.
    pub fn step(self, index: usize, delta: isize) -> usize {
        self.clamp(index.saturating_add_signed(delta))
    }

    /// Next index for a playback tick: one forward, back to the start past the end.
    pub const fn wrap_next(self, index: usize) -> usize {
        if index >= self.max {
            self.min
        } else {
            index + 1
        }
    }
}

/// Current, start and end labels shown next to the slider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodLabels {
    pub current: String,
    pub start: String,
    pub end: String,
}

impl PeriodLabels {
    pub fn for_index(mode: &ModeData, index: usize) -> Self {
        let label_at = |key: Option<&String>| key.map(|k| period_label(k)).unwrap_or_default();

        Self {
            current: label_at(mode.dates.get(index).or_else(|| mode.dates.last())),
            start: label_at(mode.dates.first()),
            end: label_at(mode.dates.last()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample_mode;

    #[test]
    fn quarter_labels_for_year_month_keys() {
        assert_eq!(period_label("2020-01"), "2020-Q1");
        assert_eq!(period_label("2020-03"), "2020-Q1");
        assert_eq!(period_label("2020-04"), "2020-Q2");
        assert_eq!(period_label("2020-09"), "2020-Q3");
        assert_eq!(period_label("2020-12"), "2020-Q4");
    }

    #[test]
    fn quarter_labels_for_iso_dates() {
        assert_eq!(period_label("2023-06-30"), "2023-Q2");
        assert_eq!(period_label("2023-12-31"), "2023-Q4");
    }

    #[test]
    fn malformed_keys_fall_back_to_raw() {
        assert_eq!(period_label("2020-13"), "2020-13");
        assert_eq!(period_label("latest"), "latest");
        assert_eq!(period_label(""), "");
        assert_eq!(period_label("   "), "");
    }

    #[test]
    fn slider_wraps_past_the_end() {
        let bounds = SliderBounds { min: 0, max: 3 };
        assert_eq!(bounds.wrap_next(2), 3);
        assert_eq!(bounds.wrap_next(3), 0);
        assert_eq!(bounds.wrap_next(7), 0);
    }

    #[test]
    fn slider_step_clamps() {
        let bounds = SliderBounds { min: 0, max: 3 };
        assert_eq!(bounds.step(0, -1), 0);
        assert_eq!(bounds.step(3, 1), 3);
        assert_eq!(bounds.step(1, 1), 2);
        assert_eq!(bounds.clamp(10), 3);
    }

    #[test]
    fn empty_mode_has_single_slot() {
        let bounds = SliderBounds::for_mode(&ModeData::default());
        assert_eq!(bounds, SliderBounds { min: 0, max: 0 });
        assert_eq!(bounds.wrap_next(0), 0);
    }

    #[test]
    fn labels_cover_current_start_and_end() {
        let labels = PeriodLabels::for_index(&sample_mode(), 0);
        assert_eq!(labels.current, "2020-Q1");
        assert_eq!(labels.start, "2020-Q1");
        assert_eq!(labels.end, "2020-Q2");

        let missing = PeriodLabels::for_index(&ModeData::default(), 0);
        assert_eq!(missing, PeriodLabels::default());
    }
}
