use eframe::egui::{self, Ui};
use egui_extras::{Size, StripBuilder};

use crate::report::ChartGrid;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + title ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors ----
        egui::SidePanel::left("selector_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: 2×2 chart grid ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.charts() {
            Some(grid) => chart_grid(ui, grid, &self.state),
            None => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Select a report type (and a year) to view statistics");
                });
            }
        });
    }
}

/// Two rows of two equally sized charts.
fn chart_grid(ui: &mut Ui, grid: &ChartGrid, state: &AppState) {
    StripBuilder::new(ui)
        .sizes(Size::remainder(), 2)
        .vertical(|mut rows| {
            for (r, row) in grid.rows.iter().enumerate() {
                rows.strip(|builder| {
                    builder.sizes(Size::remainder(), 2).horizontal(|mut cells| {
                        for (c, spec) in row.iter().enumerate() {
                            cells.cell(|ui| plot::chart(ui, r * 2 + c, spec, &state.color_map));
                        }
                    });
                });
            }
        });
}
