use eframe::egui::{self, Color32, RichText, Ui};

use crate::report::{ReportKind, YEAR_RANGE};
use crate::state::AppState;

pub const DASHBOARD_TITLE: &str = "Automobile Sales Statistics Dashboard";

// ---------------------------------------------------------------------------
// Left side panel – report selectors
// ---------------------------------------------------------------------------

/// Render the report type and year selectors.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Report");
    ui.separator();

    let selection = state.selection();

    // ---- Report type ----
    ui.label("Select Statistics:");
    let report_text = selection
        .report_kind
        .map(|k| k.label().to_string())
        .unwrap_or_else(|| "Select a report type".to_string());
    egui::ComboBox::from_id_salt("dropdown_statistics")
        .selected_text(report_text)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ReportKind::ALL {
                if ui
                    .selectable_label(selection.report_kind == Some(kind), kind.label())
                    .clicked()
                {
                    state.set_report_kind(Some(kind));
                }
            }
        });
    if selection.report_kind.is_some() && ui.small_button("Clear").clicked() {
        state.set_report_kind(None);
    }

    ui.add_space(12.0);

    // ---- Year (only for the yearly report) ----
    ui.label("Select Year:");
    let enabled = state.year_selector_enabled();
    let year_text = selection
        .selected_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Select Year".to_string());
    ui.add_enabled_ui(enabled, |ui: &mut Ui| {
        egui::ComboBox::from_id_salt("select_year")
            .selected_text(year_text)
            .width(ui.available_width())
            .height(320.0)
            .show_ui(ui, |ui: &mut Ui| {
                for year in YEAR_RANGE {
                    if ui
                        .selectable_label(selection.selected_year == Some(year), year.to_string())
                        .clicked()
                    {
                        state.set_year(Some(year));
                    }
                }
            });
    });

    ui.add_space(12.0);
    ui.separator();

    // ---- Legend: vehicle type colours ----
    ui.strong("Vehicle types");
    for vt in state.dataset.vehicle_types() {
        let color = state.color_map.color_for(vt, Color32::GRAY);
        ui.label(RichText::new(vt).color(color));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let can_export = state.charts().is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export charts as JSON…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows, {} years loaded from {}",
            state.dataset.len(),
            state.dataset.years().len(),
            state.source
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new(DASHBOARD_TITLE)
                .size(24.0)
                .color(Color32::from_rgb(0x50, 0x3D, 0x36)),
        );
    });
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export charts")
        .set_file_name("charts.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_json(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export charts: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
