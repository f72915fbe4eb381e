//! Report pipeline: turns the dataset and the current selection into the
//! four chart descriptions shown on the dashboard.
//!
//! Everything here is a pure function of its inputs. Rendering lives in
//! [`crate::ui::plot`].

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::Serialize;

use crate::data::aggregate::{group_mean, group_sum, split_by};
use crate::data::model::{Field, FieldValue, SalesDataset, SalesRecord};
use crate::error::ParseError;

/// Years offered by the year selector.
pub const YEAR_RANGE: RangeInclusive<i32> = 1980..=2023;

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportKind {
    YearlyStatistics,
    RecessionPeriodStatistics,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::YearlyStatistics, ReportKind::RecessionPeriodStatistics];

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::YearlyStatistics => "Yearly Statistics",
            ReportKind::RecessionPeriodStatistics => "Recession Period Statistics",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "yearly statistics" | "yearly" => Ok(ReportKind::YearlyStatistics),
            "recession period statistics" | "recession" => Ok(ReportKind::RecessionPeriodStatistics),
            _ => Err(ParseError::UnknownReportKind(s.trim().to_string())),
        }
    }
}

/// The two user-controlled inputs. Either may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub report_kind: Option<ReportKind>,
    pub selected_year: Option<i32>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            report_kind: Some(ReportKind::YearlyStatistics),
            selected_year: Some(*YEAR_RANGE.start()),
        }
    }
}

/// The year selector is only meaningful for the yearly report.
pub fn year_selector_enabled(report_kind: Option<ReportKind>) -> bool {
    report_kind == Some(ReportKind::YearlyStatistics)
}

// ---------------------------------------------------------------------------
// Chart descriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: FieldValue,
    pub y: f64,
}

/// One coloured trace. Charts without a colour split have exactly one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

/// Renderer-agnostic description of a single chart.
///
/// For pie charts `x` is the slice name and `y` the slice value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_field: Field,
    pub y_field: Field,
    pub color_field: Option<Field>,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl ChartSpec {
    fn aggregated(kind: ChartKind, title: impl Into<String>, x: Field, y: Field, rows: Vec<(FieldValue, f64)>) -> Self {
        ChartSpec {
            kind,
            title: title.into(),
            x_field: x,
            y_field: y,
            color_field: None,
            x_label: x.column_name().to_string(),
            y_label: y.column_name().to_string(),
            series: vec![Series {
                name: y.column_name().to_string(),
                points: rows.into_iter().map(|(x, y)| ChartPoint { x, y }).collect(),
            }],
        }
    }

    /// Whether any series carries at least one point.
    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.points.is_empty())
    }

    /// Slice shares of a pie chart, each in `[0, 1]`. Empty when the total is zero.
    pub fn pie_shares(&self) -> Vec<(FieldValue, f64)> {
        let points: Vec<&ChartPoint> = self.series.iter().flat_map(|s| &s.points).collect();
        let total: f64 = points.iter().map(|p| p.y).sum();
        if total == 0.0 {
            return Vec::new();
        }
        points.into_iter().map(|p| (p.x.clone(), p.y / total)).collect()
    }
}

/// Exactly four charts laid out as two rows of two.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGrid {
    pub rows: [[ChartSpec; 2]; 2],
}

impl ChartGrid {
    /// The charts in reading order.
    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.rows.iter().flatten()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Build the dashboard charts for `selection`, or `None` when the selection
/// does not describe a report (no report type, or yearly without a year).
pub fn build_charts(dataset: &SalesDataset, selection: &Selection) -> Option<ChartGrid> {
    match (selection.report_kind, selection.selected_year) {
        (Some(ReportKind::RecessionPeriodStatistics), _) => Some(recession_report(dataset)),
        (Some(ReportKind::YearlyStatistics), Some(year)) => Some(yearly_report(dataset, year)),
        _ => None,
    }
}

fn recession_report(dataset: &SalesDataset) -> ChartGrid {
    let recession: Vec<&SalesRecord> = dataset.records().iter().filter(|r| r.is_recession()).collect();

    let by_year = ChartSpec::aggregated(
        ChartKind::Line,
        "Average Automobile Sales fluctuation over Recession Period",
        Field::Year,
        Field::AutomobileSales,
        group_mean(recession.iter().copied(), Field::Year, Field::AutomobileSales),
    );

    let by_vehicle = ChartSpec::aggregated(
        ChartKind::Bar,
        "Average number of vehicles sold by vehicle type",
        Field::VehicleType,
        Field::AutomobileSales,
        group_mean(recession.iter().copied(), Field::VehicleType, Field::AutomobileSales),
    );

    let expenditure = ChartSpec::aggregated(
        ChartKind::Pie,
        "Total expenditure share by vehicle type during recessions",
        Field::VehicleType,
        Field::AdvertisingExpenditure,
        group_sum(recession.iter().copied(), Field::VehicleType, Field::AdvertisingExpenditure),
    );

    // Plotted from raw rows, one series per vehicle type.
    let unemployment = ChartSpec {
        kind: ChartKind::Bar,
        title: "Effect of Unemployment Rate on Vehicle Type and Sales".to_string(),
        x_field: Field::UnemploymentRate,
        y_field: Field::AutomobileSales,
        color_field: Some(Field::VehicleType),
        x_label: "Unemployment Rate".to_string(),
        y_label: "Average Automobile Sales".to_string(),
        series: split_by(
            recession.iter().copied(),
            Field::VehicleType,
            Field::UnemploymentRate,
            Field::AutomobileSales,
        )
        .into_iter()
        .map(|(name, points)| Series {
            name: name.to_string(),
            points: points.into_iter().map(|(x, y)| ChartPoint { x, y }).collect(),
        })
        .collect(),
    };

    ChartGrid {
        rows: [[by_year, by_vehicle], [expenditure, unemployment]],
    }
}

fn yearly_report(dataset: &SalesDataset, year: i32) -> ChartGrid {
    let all = dataset.records();
    let yearly: Vec<&SalesRecord> = all.iter().filter(|r| r.year == year).collect();

    let over_years = ChartSpec::aggregated(
        ChartKind::Line,
        "Average Automobile Sales Over Years",
        Field::Year,
        Field::AutomobileSales,
        group_mean(all, Field::Year, Field::AutomobileSales),
    );

    let monthly = ChartSpec::aggregated(
        ChartKind::Line,
        "Average Monthly Automobile Sales",
        Field::Month,
        Field::AutomobileSales,
        group_mean(all, Field::Month, Field::AutomobileSales),
    );

    let by_vehicle = ChartSpec::aggregated(
        ChartKind::Bar,
        format!("Average Vehicles Sold by Vehicle Type in {year}"),
        Field::VehicleType,
        Field::AutomobileSales,
        group_mean(yearly.iter().copied(), Field::VehicleType, Field::AutomobileSales),
    );

    let expenditure = ChartSpec::aggregated(
        ChartKind::Pie,
        format!("Total Advertisement Expenditure for Each Vehicle in {year}"),
        Field::VehicleType,
        Field::AdvertisingExpenditure,
        group_sum(yearly.iter().copied(), Field::VehicleType, Field::AdvertisingExpenditure),
    );

    ChartGrid {
        rows: [[over_years, monthly], [by_vehicle, expenditure]],
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::Month;

    fn rec(year: i32, month: Month, recession: u8, vt: &str, sales: f64, adv: f64, unemp: f64) -> SalesRecord {
        SalesRecord {
            year,
            month,
            recession,
            vehicle_type: vt.to_string(),
            automobile_sales: sales,
            advertising_expenditure: adv,
            unemployment_rate: unemp,
        }
    }

    fn dataset() -> SalesDataset {
        SalesDataset::from_records(vec![
            rec(1980, Month::Jan, 1, "Supperminicar", 400.0, 1500.0, 5.4),
            rec(1980, Month::Feb, 1, "Sports", 100.0, 3000.0, 4.8),
            rec(1980, Month::Jan, 1, "Supperminicar", 600.0, 500.0, 5.4),
            rec(1981, Month::Mar, 1, "Executivecar", 200.0, 2500.0, 6.0),
            rec(1983, Month::Apr, 0, "Sports", 900.0, 1000.0, 2.1),
            rec(1983, Month::Jan, 0, "Executivecar", 700.0, 4000.0, 2.5),
            rec(2020, Month::Dec, 1, "Sports", 50.0, 800.0, 8.0),
        ])
    }

    fn recession() -> Selection {
        Selection {
            report_kind: Some(ReportKind::RecessionPeriodStatistics),
            selected_year: None,
        }
    }

    fn yearly(year: i32) -> Selection {
        Selection {
            report_kind: Some(ReportKind::YearlyStatistics),
            selected_year: Some(year),
        }
    }

    fn xs(spec: &ChartSpec) -> Vec<FieldValue> {
        spec.series[0].points.iter().map(|p| p.x.clone()).collect()
    }

    fn ys(spec: &ChartSpec) -> Vec<f64> {
        spec.series[0].points.iter().map(|p| p.y).collect()
    }

    #[test]
    fn recession_years_match_recession_rows() {
        let ds = dataset();
        let grid = build_charts(&ds, &recession()).unwrap();
        let chart = &grid.rows[0][0];
        assert_eq!(chart.kind, ChartKind::Line);

        let expected: BTreeSet<i64> = ds
            .records()
            .iter()
            .filter(|r| r.is_recession())
            .map(|r| i64::from(r.year))
            .collect();
        let got: Vec<FieldValue> = xs(chart);
        assert_eq!(got, expected.into_iter().map(FieldValue::Integer).collect::<Vec<_>>());
        assert!((ys(chart)[0] - (400.0 + 100.0 + 600.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn recession_report_layout() {
        let grid = build_charts(&dataset(), &recession()).unwrap();
        let kinds: Vec<ChartKind> = grid.charts().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Line, ChartKind::Bar, ChartKind::Pie, ChartKind::Bar]);

        let by_vehicle = &grid.rows[0][1];
        assert_eq!(by_vehicle.x_field, Field::VehicleType);
        assert_eq!(
            xs(by_vehicle),
            vec![
                FieldValue::Text("Executivecar".into()),
                FieldValue::Text("Sports".into()),
                FieldValue::Text("Supperminicar".into()),
            ]
        );
        assert_eq!(ys(by_vehicle), vec![200.0, 75.0, 500.0]);
    }

    #[test]
    fn recession_pie_sums_to_filtered_total() {
        let ds = dataset();
        let grid = build_charts(&ds, &recession()).unwrap();
        let pie = &grid.rows[1][0];
        assert_eq!(pie.kind, ChartKind::Pie);

        let filtered_total: f64 = ds
            .records()
            .iter()
            .filter(|r| r.is_recession())
            .map(|r| r.advertising_expenditure)
            .sum();
        let slice_total: f64 = ys(pie).iter().sum();
        assert!((slice_total - filtered_total).abs() < 1e-9);

        let share_total: f64 = pie.pie_shares().iter().map(|(_, s)| s).sum();
        assert!((share_total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unemployment_chart_plots_raw_rows_per_vehicle_type() {
        let grid = build_charts(&dataset(), &recession()).unwrap();
        let chart = &grid.rows[1][1];
        assert_eq!(chart.color_field, Some(Field::VehicleType));
        assert_eq!(chart.x_label, "Unemployment Rate");
        assert_eq!(chart.y_label, "Average Automobile Sales");

        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Executivecar", "Sports", "Supperminicar"]);
        let total_points: usize = chart.series.iter().map(|s| s.points.len()).sum();
        assert_eq!(total_points, 5);
        // Duplicate x values are kept, not averaged.
        let superminis = &chart.series[2].points;
        assert_eq!(superminis.len(), 2);
        assert_eq!(superminis[0].x, FieldValue::Float(5.4));
        assert_eq!(superminis[1].x, FieldValue::Float(5.4));
    }

    #[test]
    fn recession_report_ignores_selected_year() {
        let ds = dataset();
        let base = build_charts(&ds, &recession()).unwrap();
        for year in [None, Some(1980), Some(2023)] {
            let sel = Selection {
                report_kind: Some(ReportKind::RecessionPeriodStatistics),
                selected_year: year,
            };
            assert_eq!(build_charts(&ds, &sel).unwrap(), base);
        }
    }

    #[test]
    fn yearly_report_restricts_only_the_bottom_row() {
        let ds = dataset();
        let grid = build_charts(&ds, &yearly(1980)).unwrap();

        let over_years = &grid.rows[0][0];
        assert_eq!(
            xs(over_years),
            vec![
                FieldValue::Integer(1980),
                FieldValue::Integer(1981),
                FieldValue::Integer(1983),
                FieldValue::Integer(2020),
            ]
        );

        let monthly = &grid.rows[0][1];
        assert_eq!(monthly.kind, ChartKind::Line);
        assert_eq!(xs(monthly)[0], FieldValue::Month(Month::Jan));
        // Jan across all years: 400, 600, 700
        assert!((ys(monthly)[0] - 1700.0 / 3.0).abs() < 1e-9);
        assert_eq!(xs(monthly).last(), Some(&FieldValue::Month(Month::Dec)));

        let by_vehicle = &grid.rows[1][0];
        assert_eq!(by_vehicle.title, "Average Vehicles Sold by Vehicle Type in 1980");
        assert_eq!(
            xs(by_vehicle),
            vec![FieldValue::Text("Sports".into()), FieldValue::Text("Supperminicar".into())]
        );
        assert_eq!(ys(by_vehicle), vec![100.0, 500.0]);

        let pie = &grid.rows[1][1];
        assert_eq!(pie.kind, ChartKind::Pie);
        assert_eq!(pie.title, "Total Advertisement Expenditure for Each Vehicle in 1980");
        assert_eq!(ys(pie), vec![3000.0, 2000.0]);
    }

    #[test]
    fn top_row_is_independent_of_year() {
        let ds = dataset();
        let a = build_charts(&ds, &yearly(1980)).unwrap();
        let b = build_charts(&ds, &yearly(1983)).unwrap();
        assert_eq!(a.rows[0], b.rows[0]);
        assert_ne!(a.rows[1], b.rows[1]);
    }

    #[test]
    fn year_without_rows_yields_empty_charts() {
        let grid = build_charts(&dataset(), &yearly(1999)).unwrap();
        assert!(!grid.rows[1][0].has_data());
        assert!(!grid.rows[1][1].has_data());
        assert!(grid.rows[1][1].pie_shares().is_empty());
    }

    #[test]
    fn empty_dataset_yields_empty_charts() {
        let ds = SalesDataset::default();
        let grid = build_charts(&ds, &recession()).unwrap();
        assert!(grid.charts().all(|c| !c.has_data()));
    }

    #[test]
    fn incomplete_selection_renders_nothing() {
        let ds = dataset();
        let unset = Selection {
            report_kind: None,
            selected_year: Some(1980),
        };
        assert!(build_charts(&ds, &unset).is_none());
        let no_year = Selection {
            report_kind: Some(ReportKind::YearlyStatistics),
            selected_year: None,
        };
        assert!(build_charts(&ds, &no_year).is_none());
    }

    #[test]
    fn pipeline_is_idempotent() {
        let ds = dataset();
        for sel in [recession(), yearly(1981)] {
            let a = serde_json::to_vec(&build_charts(&ds, &sel)).unwrap();
            let b = serde_json::to_vec(&build_charts(&ds, &sel)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn year_selector_follows_report_kind() {
        assert!(year_selector_enabled(Some(ReportKind::YearlyStatistics)));
        assert!(!year_selector_enabled(Some(ReportKind::RecessionPeriodStatistics)));
        assert!(!year_selector_enabled(None));
    }

    #[test]
    fn report_kind_parses_labels() {
        assert_eq!("Yearly Statistics".parse::<ReportKind>().unwrap(), ReportKind::YearlyStatistics);
        assert_eq!(
            " recession ".parse::<ReportKind>().unwrap(),
            ReportKind::RecessionPeriodStatistics
        );
        assert!(matches!(
            "monthly".parse::<ReportKind>(),
            Err(ParseError::UnknownReportKind(s)) if s == "monthly"
        ));
        assert_eq!(Selection::default().selected_year, Some(1980));
    }
}
