//! Maps an ordered forecast query result onto differentiated row
//! presentations: the row at the top of the list can use a larger "today"
//! rendering, every other row uses the compact "future day" rendering.
//!
//! The binder only derives display fields from already-fetched rows; all
//! actual formatting (icons, day labels, temperature strings) is delegated
//! to the caller's `ForecastFormatter` and never interpreted here.

use serde::Serialize;

use crate::db::ForecastRow;

/// The two row presentations. There is no third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewVariant {
    Today,
    FutureDay,
}

/// Position 0 is the today variant only when the list is configured for it
/// (a one-pane phone layout); in a two-pane layout every row renders the
/// compact way.
pub fn variant_for_position(position: usize, use_today_layout: bool) -> ViewVariant {
    if position == 0 && use_today_layout {
        ViewVariant::Today
    } else {
        ViewVariant::FutureDay
    }
}

/// Formatting collaborator. Implemented by the presentation layer; the
/// binder passes its outputs through untouched.
pub trait ForecastFormatter {
    /// Icon selector for a weather condition code, sized for the variant.
    fn icon(&self, weather_id: i64, variant: ViewVariant) -> String;
    /// Friendly label for a normalized day ("Today", "Tomorrow", weekday...).
    fn day_label(&self, date_millis: i64, use_today_layout: bool) -> String;
    /// Display string for a temperature in the user's preferred unit.
    fn temperature(&self, value: f64) -> String;
}

/// Display-ready fields for one list row, all re-derived from the row's
/// current column values on every bind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundRow {
    pub variant: ViewVariant,
    pub icon: String,
    pub day_label: String,
    pub description: String,
    pub high: String,
    pub low: String,
}

pub struct ForecastBinder<F: ForecastFormatter> {
    formatter: F,
    use_today_layout: bool,
}

impl<F: ForecastFormatter> ForecastBinder<F> {
    pub fn new(formatter: F, use_today_layout: bool) -> Self {
        Self {
            formatter,
            use_today_layout,
        }
    }

    pub fn set_use_today_layout(&mut self, use_today_layout: bool) {
        self.use_today_layout = use_today_layout;
    }

    /// Bind one row at its list position. Synchronous and allocation-light;
    /// this runs on whatever context renders the list.
    pub fn bind(&self, position: usize, row: &ForecastRow) -> BoundRow {
        let variant = variant_for_position(position, self.use_today_layout);

        BoundRow {
            variant,
            icon: self.formatter.icon(row.weather_id, variant),
            day_label: self.formatter.day_label(row.date, self.use_today_layout),
            description: row.short_desc.clone(),
            high: self.formatter.temperature(row.max),
            low: self.formatter.temperature(row.min),
        }
    }

    pub fn bind_all(&self, rows: &[ForecastRow]) -> Vec<BoundRow> {
        rows.iter()
            .enumerate()
            .map(|(position, row)| self.bind(position, row))
            .collect()
    }
}
