use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{InvoiceDataset, InvoiceRecord, StoreId};

// ---------------------------------------------------------------------------
// Filter predicate: what the sidebar controls currently select
// ---------------------------------------------------------------------------

/// Store control: one store, or the "all stores" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreChoice {
    #[default]
    All,
    One(StoreId),
}

/// One entry of the status multi-select.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusChoice {
    All,
    Status(String),
}

/// The full filter selection. All active predicates are ANDed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub store: StoreChoice,
    /// Empty, or containing [`StatusChoice::All`], means no status restriction.
    pub statuses: BTreeSet<StatusChoice>,
    /// Inclusive lower bound on the entry date.
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound on the entry date.
    pub end: Option<NaiveDate>,
}

impl FilterState {
    /// Whether the status selection restricts anything.
    pub fn restricts_status(&self) -> bool {
        !self.statuses.is_empty() && !self.statuses.contains(&StatusChoice::All)
    }

    /// Whether a single record passes every active predicate.
    pub fn matches(&self, record: &InvoiceRecord) -> bool {
        if let StoreChoice::One(store) = &self.store {
            if record.store.as_ref() != Some(store) {
                return false;
            }
        }
        if self.restricts_status()
            && !self
                .statuses
                .contains(&StatusChoice::Status(record.status.clone()))
        {
            return false;
        }
        if self.start.is_some_and(|start| record.entry_date < start) {
            return false;
        }
        if self.end.is_some_and(|end| record.entry_date > end) {
            return false;
        }
        true
    }
}

/// Initial control state: every store, no status picked, and the date window
/// spanning the loaded entry dates.
pub fn init_filter_state(dataset: &InvoiceDataset) -> FilterState {
    let range = dataset.entry_date_range();
    FilterState {
        store: StoreChoice::All,
        statuses: BTreeSet::new(),
        start: range.map(|(min, _)| min),
        end: range.map(|(_, max)| max),
    }
}

/// Return indices of records that pass all active filters, in source order.
pub fn filtered_indices(records: &[InvoiceRecord], filters: &FilterState) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| filters.matches(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{record, ymd};

    fn sample() -> Vec<InvoiceRecord> {
        vec![
            record(1, "OK", ymd(2024, 1, 1)),
            record(1, "OK", ymd(2024, 1, 10)),
            record(2, "Pendente", ymd(2024, 1, 5)),
            record(3, "Divergente", ymd(2024, 2, 1)),
            record(2, "OK", ymd(2024, 1, 20)),
        ]
    }

    fn statuses(names: &[&str]) -> BTreeSet<StatusChoice> {
        names
            .iter()
            .map(|n| match *n {
                "*" => StatusChoice::All,
                other => StatusChoice::Status(other.to_string()),
            })
            .collect()
    }

    #[test]
    fn start_bound_keeps_later_rows() {
        let rows = vec![record(1, "OK", ymd(2024, 1, 1)), record(1, "OK", ymd(2024, 1, 10))];
        let f = FilterState {
            start: Some(ymd(2024, 1, 5)),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&rows, &f), vec![1]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let f = FilterState {
            start: Some(ymd(2024, 1, 5)),
            end: Some(ymd(2024, 1, 10)),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&sample(), &f), vec![1, 2]);
    }

    #[test]
    fn no_op_filter_keeps_everything() {
        let rows = sample();
        assert_eq!(filtered_indices(&rows, &FilterState::default()), vec![0, 1, 2, 3, 4]);

        let all_sentinel = FilterState {
            statuses: statuses(&["*", "OK"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&rows, &all_sentinel).len(), rows.len());
    }

    #[test]
    fn store_and_status_predicates_are_anded() {
        let f = FilterState {
            store: StoreChoice::One(StoreId::Number(2)),
            statuses: statuses(&["OK", "Divergente"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&sample(), &f), vec![4]);
    }

    #[test]
    fn blank_store_matches_only_the_all_choice() {
        let mut rows = sample();
        rows[0].store = None;
        assert_eq!(filtered_indices(&rows, &FilterState::default()).len(), rows.len());
        let f = FilterState {
            store: StoreChoice::One(StoreId::Number(1)),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&rows, &f), vec![1]);
    }

    #[test]
    fn unknown_store_yields_empty_view() {
        let f = FilterState {
            store: StoreChoice::One(StoreId::Number(99)),
            ..Default::default()
        };
        assert!(filtered_indices(&sample(), &f).is_empty());
    }

    #[test]
    fn filtering_a_filtered_view_equals_the_conjunction() {
        let rows = sample();
        let f1 = FilterState {
            statuses: statuses(&["OK"]),
            ..Default::default()
        };
        let f2 = FilterState {
            end: Some(ymd(2024, 1, 15)),
            ..Default::default()
        };

        let first: Vec<InvoiceRecord> = filtered_indices(&rows, &f1)
            .into_iter()
            .map(|i| rows[i].clone())
            .collect();
        let twice: Vec<InvoiceRecord> = filtered_indices(&first, &f2)
            .into_iter()
            .map(|i| first[i].clone())
            .collect();
        let both: Vec<InvoiceRecord> = rows
            .iter()
            .filter(|r| f1.matches(r) && f2.matches(r))
            .cloned()
            .collect();
        assert_eq!(twice, both);
        assert_eq!(twice.len(), 2);
    }

    #[test]
    fn source_is_untouched() {
        let rows = sample();
        let before = rows.clone();
        let f = FilterState {
            store: StoreChoice::One(StoreId::Number(1)),
            ..Default::default()
        };
        let _ = filtered_indices(&rows, &f);
        assert_eq!(rows, before);
    }

    #[test]
    fn initial_state_spans_loaded_dates() {
        let ds = InvoiceDataset::from_records(sample(), Vec::new());
        let f = init_filter_state(&ds);
        assert_eq!(f.store, StoreChoice::All);
        assert!(f.statuses.is_empty());
        assert_eq!(f.start, Some(ymd(2024, 1, 1)));
        assert_eq!(f.end, Some(ymd(2024, 2, 1)));
        assert_eq!(filtered_indices(&ds.records, &f).len(), ds.len());
    }
}
