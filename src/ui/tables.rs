use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::StoreAverage;
use crate::data::export::row_cells;
use crate::data::model::{InvoiceDataset, REQUIRED_COLUMNS};

const ROW_HEIGHT: f32 = 18.0;
const FILTERED_TABLE_HEIGHT: f32 = 320.0;

/// Every column of the visible rows, schema columns first.
pub fn filtered_table(ui: &mut Ui, dataset: &InvoiceDataset, visible: &[usize]) {
    let headers: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .chain(dataset.extra_columns.iter().map(String::as_str))
        .collect();

    ui.push_id("filtered_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(FILTERED_TABLE_HEIGHT)
            .columns(Column::auto().at_least(70.0), headers.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for h in &headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*h);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, visible.len(), |mut row| {
                    let record = &dataset.records[visible[row.index()]];
                    for cell in row_cells(record, &dataset.extra_columns) {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

/// Stores at or above the slow-turnaround threshold.
pub fn slow_stores_table(ui: &mut Ui, slow: &[StoreAverage]) {
    if slow.is_empty() {
        ui.label("No store at or above the threshold.");
        return;
    }
    ui.push_id("slow_stores_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(90.0))
            .column(Column::auto().at_least(140.0))
            .column(Column::remainder())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for h in ["numero_loja", "dias_entre_datas (mean)", "rows"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for avg in slow {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(avg.store.to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.2}", avg.mean_days));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(avg.samples.to_string());
                        });
                    });
                }
            });
    });
}
