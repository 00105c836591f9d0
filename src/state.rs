use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::aggregate::Report;
use crate::data::export::{export_path, export_to_file};
use crate::data::filter::{filtered_indices, init_filter_state, FilterState, StatusChoice, StoreChoice};
use crate::data::loader::load_dataset;
use crate::data::model::InvoiceDataset;
use crate::data::source::latest_matching_file;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded dataset (None when no source was found or it failed to load).
    pub dataset: Option<InvoiceDataset>,

    /// Sidebar selections.
    pub filters: FilterState,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates over `visible_indices` (cached).
    pub report: Report,

    /// Per-store bar colours.
    pub color_map: Option<ColorMap>,

    /// Error message shown in the UI.
    pub status_message: Option<String>,

    /// Informational message (e.g. where the last export went).
    pub notice: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            dataset: None,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            report: Report::empty(),
            color_map: None,
            status_message: None,
            notice: None,
        }
    }
}

impl AppState {
    /// Pick the newest source file and load it. Failures end up in
    /// `status_message`; the dashboard then shows no data.
    pub fn startup(config: AppConfig, today: NaiveDate) -> Self {
        let mut state = AppState {
            config,
            ..Default::default()
        };
        let source = &state.config.source;

        let found = match latest_matching_file(&source.directory, &source.prefix, &source.suffix) {
            Ok(found) => found,
            Err(e) => {
                log::error!("Failed to scan source directory: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                return state;
            }
        };

        let Some(file) = found else {
            log::warn!(
                "No file matching {}*{} in {}",
                source.prefix,
                source.suffix,
                source.directory.display()
            );
            state.status_message = Some(format!(
                "No file matching {}*{} found in {}",
                source.prefix,
                source.suffix,
                source.directory.display()
            ));
            return state;
        };

        log::info!("Loading {}", file.path.display());
        match load_dataset(&file.path, state.config.normalize_options(), today) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} invoice rows ({} stores, {} statuses), extra columns {:?}",
                    dataset.len(),
                    dataset.stores.len(),
                    dataset.statuses.len(),
                    dataset.extra_columns
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
        state
    }

    /// Ingest a loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: InvoiceDataset) {
        self.filters = init_filter_state(&dataset);
        self.color_map = Some(ColorMap::new(&dataset.stores));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the report after a filter change.
    pub fn refilter(&mut self) {
        match &self.dataset {
            Some(ds) => {
                self.visible_indices = filtered_indices(&ds.records, &self.filters);
                self.report = Report::build(&ds.records, &self.visible_indices);
            }
            None => {
                self.visible_indices.clear();
                self.report = Report::empty();
            }
        }
        log::debug!(
            "Filter {:?} keeps {} row(s)",
            self.filters,
            self.visible_indices.len()
        );
    }

    pub fn set_store(&mut self, store: StoreChoice) {
        self.filters.store = store;
        self.refilter();
    }

    /// Toggle one entry of the status multi-select.
    pub fn toggle_status(&mut self, choice: &StatusChoice) {
        if !self.filters.statuses.remove(choice) {
            self.filters.statuses.insert(choice.clone());
        }
        self.refilter();
    }

    pub fn clear_statuses(&mut self) {
        self.filters.statuses.clear();
        self.refilter();
    }

    pub fn set_date_window(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.filters.start = start;
        self.filters.end = end;
        self.refilter();
    }

    /// Write the visible rows to a timestamped CSV in the export directory.
    pub fn export_visible(&mut self, now: NaiveDateTime) -> Option<PathBuf> {
        let ds = self.dataset.as_ref()?;
        let path = export_path(self.config.export_dir(), now);
        match export_to_file(ds, &self.visible_indices, &path) {
            Ok(path) => {
                log::info!("Exported {} row(s) to {}", self.visible_indices.len(), path.display());
                self.notice = Some(format!("Exported to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::ymd;
    use crate::data::model::StoreId;
    use std::path::Path;

    const HEADER: &str = "numero_loja,descricao_status,data_entrada,data_emissao,numero_nf,dias_entre_datas";

    fn config_for(dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.source.directory = dir.to_path_buf();
        config.source.suffix = ".csv".to_string();
        config
    }

    fn write_source(dir: &Path, name: &str, rows: &[&str]) {
        let mut text = format!("{HEADER}\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        std::fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn startup_without_source_reports_and_halts() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::startup(config_for(dir.path()), ymd(2024, 1, 1));
        assert!(state.dataset.is_none());
        assert!(state.status_message.unwrap().contains("No file matching"));
        assert_eq!(state.report.row_count, 0);
    }

    #[test]
    fn startup_reports_schema_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("entrada_mercadoria_1.csv"),
            "numero_loja,descricao_status\n1,OK\n",
        )
        .unwrap();
        let state = AppState::startup(config_for(dir.path()), ymd(2024, 1, 1));
        assert!(state.dataset.is_none());
        let msg = state.status_message.unwrap();
        assert!(msg.contains("missing required column"), "{msg}");
        assert!(msg.contains("dias_entre_datas"), "{msg}");
    }

    #[test]
    fn controls_refilter_the_report() {
        let dir = tempfile::tempdir().unwrap();
        write_source(
            dir.path(),
            "entrada_mercadoria_1.csv",
            &[
                "1,OK,2024-01-01,2024-01-01,10,5",
                "1,OK,2024-01-10,2024-01-09,11,3",
                "2,Pendente,2024-01-12,2024-01-09,12,1",
            ],
        );
        let mut state = AppState::startup(config_for(dir.path()), ymd(2024, 6, 1));
        assert!(state.status_message.is_none());
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.report.slow_stores.len(), 1);

        state.set_store(StoreChoice::One(StoreId::Number(1)));
        assert_eq!(state.visible_indices, vec![0, 1]);

        state.set_date_window(Some(ymd(2024, 1, 5)), None);
        assert_eq!(state.visible_indices, vec![1]);
        assert!(state.report.slow_stores.is_empty());

        state.set_store(StoreChoice::All);
        state.toggle_status(&StatusChoice::Status("Pendente".into()));
        assert_eq!(state.visible_indices, vec![2]);
        state.toggle_status(&StatusChoice::All);
        assert_eq!(state.visible_indices, vec![1, 2]);
        state.clear_statuses();
        assert_eq!(state.visible_indices, vec![1, 2]);
    }

    #[test]
    fn export_writes_under_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "entrada_mercadoria_1.csv", &["1,OK,2024-01-01,2024-01-01,10,5"]);
        let mut state = AppState::startup(config_for(dir.path()), ymd(2024, 6, 1));
        let now = ymd(2024, 6, 1).and_hms_opt(8, 0, 0).unwrap();
        let path = state.export_visible(now).unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(state.notice.is_some());
        assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 2);
    }

    #[test]
    fn export_is_not_loaded_as_the_next_source() {
        let dir = tempfile::tempdir().unwrap();
        write_source(
            dir.path(),
            "entrada_mercadoria_1.csv",
            &["1,OK,2024-01-01,2024-01-01,10,5", "2,OK,2024-01-02,2024-01-01,11,2"],
        );
        let mut state = AppState::startup(config_for(dir.path()), ymd(2024, 6, 1));
        state.set_store(StoreChoice::One(StoreId::Number(1)));
        let now = chrono::Local::now().naive_local();
        state.export_visible(now).unwrap();

        let next = AppState::startup(config_for(dir.path()), ymd(2024, 6, 1));
        let ds = next.dataset.unwrap();
        assert_eq!(ds.source_name().as_deref(), Some("entrada_mercadoria_1.csv"));
        assert_eq!(ds.len(), 2);
    }
}
