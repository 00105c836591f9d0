use eframe::egui::{self, ScrollArea, Ui};

use crate::data::aggregate::SLOW_STORE_THRESHOLD_DAYS;
use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EntradaNfApp {
    pub state: AppState,
}

impl EntradaNfApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for EntradaNfApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: toolbar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            report_view(ui, &self.state);
        });
    }
}

fn report_view(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let msg = state
                .status_message
                .as_deref()
                .unwrap_or("No data loaded.");
            ui.heading(msg);
        });
        return;
    };
    let report = &state.report;
    let colors = state.color_map.as_ref();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(format!("Filtered invoices ({})", report.row_count));
            tables::filtered_table(ui, dataset, &state.visible_indices);
            ui.add_space(12.0);

            ui.heading(format!(
                "Stores averaging {SLOW_STORE_THRESHOLD_DAYS} or more days between dates"
            ));
            tables::slow_stores_table(ui, &report.slow_stores);
            ui.add_space(12.0);

            ui.separator();
            plot::bar_chart(ui, "invoices_by_store", &report.invoices_by_store, colors);
            ui.add_space(12.0);
            plot::bar_chart(ui, "invoices_by_issue_day", &report.invoices_by_issue_day, None);
            ui.add_space(12.0);
            plot::bar_chart(ui, "turnaround_by_store", &report.turnaround_by_store, colors);
        });
}
