use std::collections::{BTreeMap, BTreeSet};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints};

use crate::color::{ColorMap, generate_palette};
use crate::data::model::{Field, FieldValue};
use crate::report::{ChartKind, ChartSpec};

/// Largest angle (radians) drawn as a single pie triangle.
const MAX_WEDGE: f32 = 0.05;

// ---------------------------------------------------------------------------
// Chart cell
// ---------------------------------------------------------------------------

/// Render one chart (title + body) into the available space.
pub fn chart(ui: &mut Ui, id: usize, spec: &ChartSpec, colors: &ColorMap) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(&spec.title).strong());
        if !spec.has_data() {
            ui.label(RichText::new("No data for this selection").weak());
        }
        match spec.kind {
            ChartKind::Line | ChartKind::Bar => xy_chart(ui, id, spec, colors),
            ChartKind::Pie => pie_chart(ui, spec, colors),
        }
    });
}

// ---------------------------------------------------------------------------
// X axis placement
// ---------------------------------------------------------------------------

/// Maps chart x values to plot coordinates.
///
/// Numeric values sit at their own position; categories (months, vehicle
/// types) are laid out at 0, 1, 2, … in key order and labelled on the axis.
enum XAxis {
    Numeric,
    Categorical(BTreeMap<FieldValue, usize>),
}

impl XAxis {
    fn for_spec(spec: &ChartSpec) -> Self {
        let values: BTreeSet<&FieldValue> = spec.series.iter().flat_map(|s| s.points.iter().map(|p| &p.x)).collect();
        if values.iter().all(|v| v.as_f64().is_some()) {
            XAxis::Numeric
        } else {
            XAxis::Categorical(values.into_iter().cloned().enumerate().map(|(i, v)| (v, i)).collect())
        }
    }

    fn position(&self, x: &FieldValue) -> f64 {
        match self {
            XAxis::Numeric => x.as_f64().unwrap_or_default(),
            XAxis::Categorical(index) => index.get(x).map(|&i| i as f64).unwrap_or_default(),
        }
    }

    /// Tick labels for categorical axes, by position.
    fn labels(&self) -> Option<Vec<String>> {
        match self {
            XAxis::Numeric => None,
            XAxis::Categorical(index) => {
                let mut labels = vec![String::new(); index.len()];
                for (v, &i) in index {
                    labels[i] = v.to_string();
                }
                Some(labels)
            }
        }
    }

    /// Bar width that keeps neighbouring bars from overlapping.
    fn bar_width(&self, spec: &ChartSpec) -> f64 {
        match self {
            XAxis::Categorical(_) => 0.6,
            XAxis::Numeric => {
                let mut xs: Vec<f64> = spec
                    .series
                    .iter()
                    .flat_map(|s| s.points.iter().filter_map(|p| p.x.as_f64()))
                    .collect();
                xs.sort_by(f64::total_cmp);
                xs.dedup();
                let gap = xs
                    .windows(2)
                    .map(|w| w[1] - w[0])
                    .fold(f64::INFINITY, f64::min);
                if gap.is_finite() { gap * 0.8 } else { 0.5 }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Line / bar charts
// ---------------------------------------------------------------------------

fn xy_chart(ui: &mut Ui, id: usize, spec: &ChartSpec, colors: &ColorMap) {
    let axis = XAxis::for_spec(spec);

    let mut plot = Plot::new(("dashboard_chart", id))
        .x_axis_label(spec.x_label.clone())
        .y_axis_label(spec.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);

    if spec.color_field.is_some() {
        plot = plot.legend(Legend::default());
    }

    if let Some(labels) = axis.labels() {
        plot = plot.x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        });
    }

    let palette = generate_palette(spec.series.len());

    plot.show(ui, |plot_ui| match spec.kind {
        ChartKind::Line => {
            for (i, series) in spec.series.iter().enumerate() {
                let points: PlotPoints = series
                    .points
                    .iter()
                    .map(|p| [axis.position(&p.x), p.y])
                    .collect();
                let color = series_color(spec, &series.name, colors, palette.get(i).copied());
                plot_ui.line(Line::new(points).name(&series.name).color(color).width(2.0));
            }
        }
        ChartKind::Bar => {
            let width = axis.bar_width(spec);
            // Bars sharing an x position stack on top of each other.
            let mut stack: BTreeMap<FieldValue, f64> = BTreeMap::new();
            for (i, series) in spec.series.iter().enumerate() {
                let series_fill = series_color(spec, &series.name, colors, palette.get(i).copied());
                let bars: Vec<Bar> = series
                    .points
                    .iter()
                    .map(|p| {
                        let base = stack.entry(p.x.clone()).or_insert(0.0);
                        let fill = if spec.x_field == Field::VehicleType {
                            colors.color_for(&p.x.to_string(), series_fill)
                        } else {
                            series_fill
                        };
                        let bar = Bar::new(axis.position(&p.x), p.y)
                            .width(width)
                            .base_offset(*base)
                            .fill(fill)
                            .name(format!("{}: {}", p.x, p.y));
                        *base += p.y;
                        bar
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(series_fill));
            }
        }
        ChartKind::Pie => {}
    });
}

/// Colour for a series: by category when the chart is split by vehicle type.
fn series_color(spec: &ChartSpec, name: &str, colors: &ColorMap, fallback: Option<Color32>) -> Color32 {
    let fallback = fallback.unwrap_or(Color32::LIGHT_BLUE);
    match spec.color_field {
        Some(Field::VehicleType) => colors.color_for(name, fallback),
        _ if spec.series.len() == 1 => Color32::LIGHT_BLUE,
        _ => fallback,
    }
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

fn pie_chart(ui: &mut Ui, spec: &ChartSpec, colors: &ColorMap) {
    let shares = spec.pie_shares();
    if shares.is_empty() {
        return;
    }
    let values: Vec<f64> = spec.series.iter().flat_map(|s| s.points.iter().map(|p| p.y)).collect();
    let palette = generate_palette(shares.len());

    ui.horizontal(|ui: &mut Ui| {
        let side = ui.available_height().min(ui.available_width() * 0.6).max(40.0);
        let (response, painter) = ui.allocate_painter(Vec2::splat(side), Sense::hover());
        let center = response.rect.center();
        let radius = side * 0.45;
        let at = |angle: f32| center + Vec2::angled(angle) * radius;

        let mut start = -FRAC_PI_2;
        let mut boundaries = Vec::with_capacity(shares.len());
        for (i, (name, share)) in shares.iter().enumerate() {
            let fill = colors.color_for(&name.to_string(), palette[i]);
            let sweep = *share as f32 * TAU;
            let steps = (sweep / MAX_WEDGE).ceil().max(1.0) as usize;
            let step = sweep / steps as f32;
            for k in 0..steps {
                let a0 = start + step * k as f32;
                let a1 = a0 + step;
                painter.add(Shape::convex_polygon(vec![center, at(a0), at(a1)], fill, Stroke::NONE));
            }
            boundaries.push(start);
            start += sweep;
        }

        if shares.len() > 1 {
            let stroke = Stroke::new(1.5, ui.visuals().panel_fill);
            for angle in boundaries {
                let edge: Pos2 = at(angle);
                painter.line_segment([center, edge], stroke);
            }
        }

        ui.vertical(|ui: &mut Ui| {
            for (i, ((name, share), value)) in shares.iter().zip(&values).enumerate() {
                let fill = colors.color_for(&name.to_string(), palette[i]);
                ui.horizontal(|ui: &mut Ui| {
                    let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, fill);
                    ui.label(format!("{name}  {:.1}%  ({value:.0})", share * 100.0));
                });
            }
        });
    });
}
