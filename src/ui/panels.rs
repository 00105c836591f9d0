use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::{StatusChoice, StoreChoice};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the closures.
    let stores = dataset.stores.clone();
    let statuses = dataset.statuses.clone();
    let range = dataset.entry_date_range();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Store (single choice) ----
            ui.strong("Store");
            let current = match &state.filters.store {
                StoreChoice::All => "All".to_string(),
                StoreChoice::One(s) => s.to_string(),
            };
            egui::ComboBox::from_id_salt("store_filter")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    let all_selected = state.filters.store == StoreChoice::All;
                    if ui.selectable_label(all_selected, "All").clicked() && !all_selected {
                        state.set_store(StoreChoice::All);
                    }
                    for store in &stores {
                        let choice = StoreChoice::One(store.clone());
                        let selected = state.filters.store == choice;
                        if ui.selectable_label(selected, store.to_string()).clicked() && !selected {
                            state.set_store(choice);
                        }
                    }
                });
            ui.separator();

            // ---- Status (multi choice) ----
            let n_selected = state.filters.statuses.len();
            egui::CollapsingHeader::new(RichText::new(format!("Status  ({n_selected} selected)")).strong())
                .id_salt("status_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Clear").clicked() {
                        state.clear_statuses();
                    }
                    let choices = std::iter::once(StatusChoice::All)
                        .chain(statuses.iter().cloned().map(StatusChoice::Status));
                    for choice in choices {
                        let label = match &choice {
                            StatusChoice::All => "All".to_string(),
                            StatusChoice::Status(s) => s.clone(),
                        };
                        let mut checked = state.filters.statuses.contains(&choice);
                        if ui.checkbox(&mut checked, label).changed() {
                            state.toggle_status(&choice);
                        }
                    }
                });
            ui.separator();

            // ---- Entry date window ----
            ui.strong("Entry date");
            let (mut start, mut end) = (state.filters.start, state.filters.end);
            let mut changed = false;
            if let Some((min, max)) = range {
                changed |= date_bound(ui, "Start", "start_date", &mut start, min);
                changed |= date_bound(ui, "End", "end_date", &mut end, max);
            }
            if changed {
                state.set_date_window(start, end);
            }
        });
}

/// Checkbox enabling a bound plus its date picker. Returns true when the bound changed.
fn date_bound(
    ui: &mut Ui,
    label: &str,
    id: &str,
    bound: &mut Option<chrono::NaiveDate>,
    fallback: chrono::NaiveDate,
) -> bool {
    let before = *bound;
    ui.horizontal(|ui: &mut Ui| {
        let mut enabled = bound.is_some();
        if ui.checkbox(&mut enabled, label).changed() {
            *bound = enabled.then_some(fallback);
        }
        if let Some(date) = bound.as_mut() {
            ui.add(DatePickerButton::new(date).id_salt(id));
        }
    });
    *bound != before
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let can_export = state.dataset.is_some();
            if ui.add_enabled(can_export, egui::Button::new("Export CSV")).clicked() {
                state.export_visible(chrono::Local::now().naive_local());
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            if let Some(name) = ds.source_name() {
                ui.label(format!("File loaded: {name}"));
                ui.separator();
            }
            ui.label(format!(
                "{} invoices loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            if ds.defaulted_entry_dates > 0 {
                ui.separator();
                ui.label(
                    RichText::new(format!("{} entry date(s) defaulted to today", ds.defaulted_entry_dates))
                        .color(Color32::YELLOW),
                );
            }
        }

        if let Some(msg) = &state.notice {
            ui.separator();
            ui.label(msg);
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
