use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::loader::DataSource;
use crate::data::model::SalesDataset;
use crate::report::{ChartGrid, ReportKind, Selection, build_charts, year_selector_enabled};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Dataset loaded at startup; never mutated afterwards.
    pub dataset: Arc<SalesDataset>,

    /// Where the dataset came from (shown in the top bar).
    pub source: DataSource,

    /// Current dropdown values.
    selection: Selection,

    /// Charts for the current selection (cached, `None` when nothing to show).
    charts: Option<ChartGrid>,

    /// Colour per vehicle type.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Arc<SalesDataset>, source: DataSource, selection: Selection) -> Self {
        let color_map = ColorMap::new(dataset.vehicle_types());
        let mut state = Self {
            dataset,
            source,
            selection,
            charts: None,
            color_map,
            status_message: None,
        };
        state.recompute();
        state
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn charts(&self) -> Option<&ChartGrid> {
        self.charts.as_ref()
    }

    pub fn year_selector_enabled(&self) -> bool {
        year_selector_enabled(self.selection.report_kind)
    }

    pub fn set_report_kind(&mut self, kind: Option<ReportKind>) {
        if self.selection.report_kind != kind {
            self.selection.report_kind = kind;
            self.recompute();
        }
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        if self.selection.selected_year != year {
            self.selection.selected_year = year;
            self.recompute();
        }
    }

    /// Write the current charts as pretty JSON (`null` when nothing is shown).
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.charts).context("serializing charts")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported charts to {}", path.display());
        Ok(())
    }

    /// Rebuild the cached charts from the dataset and current selection.
    fn recompute(&mut self) {
        self.charts = build_charts(&self.dataset, &self.selection);
        match &self.charts {
            Some(grid) => log::debug!(
                "Recomputed charts for {:?} / {:?}: {} of 4 with data",
                self.selection.report_kind,
                self.selection.selected_year,
                grid.charts().filter(|c| c.has_data()).count()
            ),
            None => log::debug!("Selection {:?} has nothing to show", self.selection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Month, SalesRecord};

    fn state() -> AppState {
        let mk = |year, recession, vt: &str, sales| SalesRecord {
            year,
            month: Month::Jan,
            recession,
            vehicle_type: vt.to_string(),
            automobile_sales: sales,
            advertising_expenditure: 10.0,
            unemployment_rate: 3.0,
        };
        let ds = SalesDataset::from_records(vec![
            mk(1980, 1, "Sports", 1.0),
            mk(1981, 0, "Sports", 2.0),
            mk(1981, 0, "Executivecar", 3.0),
        ]);
        AppState::new(Arc::new(ds), DataSource::parse("sales.csv"), Selection::default())
    }

    #[test]
    fn charts_are_built_on_construction() {
        let s = state();
        let grid = s.charts().unwrap();
        assert_eq!(grid.rows[1][0].title, "Average Vehicles Sold by Vehicle Type in 1980");
        assert_eq!(s.color_map.len(), 2);
    }

    #[test]
    fn changing_year_recomputes() {
        let mut s = state();
        s.set_year(Some(1981));
        let grid = s.charts().unwrap();
        assert_eq!(grid.rows[1][0].title, "Average Vehicles Sold by Vehicle Type in 1981");
        assert_eq!(grid.rows[1][0].series[0].points.len(), 2);
    }

    #[test]
    fn recession_report_disables_year_and_ignores_it() {
        let mut s = state();
        assert!(s.year_selector_enabled());
        s.set_report_kind(Some(ReportKind::RecessionPeriodStatistics));
        assert!(!s.year_selector_enabled());
        let before = s.charts().cloned();
        s.set_year(Some(1981));
        assert_eq!(s.charts().cloned(), before);
        assert_eq!(s.selection().selected_year, Some(1981));
    }

    #[test]
    fn export_writes_current_charts() {
        let s = state();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts.json");
        s.export_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let rows = value["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0]["kind"], "line");
        assert_eq!(rows[1][1]["kind"], "pie");
        assert_eq!(rows[0][0]["series"][0]["points"][0]["x"], 1980);
    }

    #[test]
    fn clearing_selection_hides_charts() {
        let mut s = state();
        s.set_report_kind(None);
        assert!(s.charts().is_none());
        s.set_report_kind(Some(ReportKind::YearlyStatistics));
        s.set_year(None);
        assert!(s.charts().is_none());
    }
}
