use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;

use super::model::{InvoiceRecord, StoreId};

/// Stores averaging at least this many days between dates are flagged as slow.
pub const SLOW_STORE_THRESHOLD_DAYS: f64 = 4.0;

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

/// Per-store mean of "days between dates".
#[derive(Debug, Clone, PartialEq)]
pub struct StoreAverage {
    pub store: StoreId,
    pub mean_days: f64,
    /// Number of rows that contributed a value.
    pub samples: usize,
}

impl StoreAverage {
    /// The mean rounded up to the next whole day.
    pub fn rounded_up(&self) -> f64 {
        self.mean_days.ceil()
    }
}

/// Rows per store, ordered by store. Rows without a store are left out.
pub fn count_by_store<'a>(records: impl IntoIterator<Item = &'a InvoiceRecord>) -> Vec<(StoreId, usize)> {
    let mut counts: BTreeMap<StoreId, usize> = BTreeMap::new();
    for r in records {
        if let Some(store) = &r.store {
            *counts.entry(store.clone()).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

/// Distinct invoice numbers per day-of-month of the issuance date.
/// Rows without an issuance date or an invoice number are left out.
pub fn distinct_invoices_by_issue_day<'a>(
    records: impl IntoIterator<Item = &'a InvoiceRecord>,
) -> Vec<(u32, usize)> {
    let mut per_day: BTreeMap<u32, BTreeSet<&str>> = BTreeMap::new();
    for r in records {
        if let (Some(issued), Some(number)) = (r.issue_date, &r.invoice_number) {
            per_day.entry(issued.day()).or_default().insert(number.as_str());
        }
    }
    per_day
        .into_iter()
        .map(|(day, numbers)| (day, numbers.len()))
        .collect()
}

/// Mean "days between dates" per store, ordered by store.
/// Stores without any numeric value, and rows without a store, are omitted.
pub fn average_days_by_store<'a>(records: impl IntoIterator<Item = &'a InvoiceRecord>) -> Vec<StoreAverage> {
    let mut sums: BTreeMap<StoreId, (f64, usize)> = BTreeMap::new();
    for r in records {
        if let (Some(store), Some(days)) = (&r.store, r.days_between) {
            let entry = sums.entry(store.clone()).or_default();
            entry.0 += days;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(store, (sum, n))| StoreAverage {
            store,
            mean_days: sum / n as f64,
            samples: n,
        })
        .collect()
}

/// Stores whose unrounded mean reaches [`SLOW_STORE_THRESHOLD_DAYS`].
pub fn slow_stores(averages: &[StoreAverage]) -> Vec<StoreAverage> {
    averages
        .iter()
        .filter(|a| a.mean_days >= SLOW_STORE_THRESHOLD_DAYS)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Chart description, independent of the UI toolkit
// ---------------------------------------------------------------------------

/// One labelled bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarDatum {
    pub label: String,
    pub value: f64,
    /// Store behind the bar, when the category is a store (drives colour).
    pub store: Option<StoreId>,
}

/// A titled bar chart with axis labels.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub bars: Vec<BarDatum>,
}

/// Everything the central panel shows for one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub row_count: usize,
    pub invoices_by_store: BarSeries,
    pub invoices_by_issue_day: BarSeries,
    pub turnaround_by_store: BarSeries,
    pub slow_stores: Vec<StoreAverage>,
}

impl Report {
    /// Run every reducer over the visible rows.
    pub fn build(records: &[InvoiceRecord], visible: &[usize]) -> Self {
        let rows = || visible.iter().map(|&i| &records[i]);

        let counts = count_by_store(rows());
        let per_day = distinct_invoices_by_issue_day(rows());
        let averages = average_days_by_store(rows());

        Report {
            row_count: visible.len(),
            invoices_by_store: BarSeries {
                title: "Invoices per store",
                x_label: "Store number",
                y_label: "Invoices",
                bars: counts
                    .into_iter()
                    .map(|(store, n)| BarDatum {
                        label: store.to_string(),
                        value: n as f64,
                        store: Some(store),
                    })
                    .collect(),
            },
            invoices_by_issue_day: BarSeries {
                title: "Distinct invoices per issuance day",
                x_label: "Day of month",
                y_label: "Invoices",
                bars: per_day
                    .into_iter()
                    .map(|(day, n)| BarDatum {
                        label: day.to_string(),
                        value: n as f64,
                        store: None,
                    })
                    .collect(),
            },
            turnaround_by_store: BarSeries {
                title: "Average days checked per store",
                x_label: "Store number",
                y_label: "Average days (rounded up)",
                bars: averages
                    .iter()
                    .map(|a| BarDatum {
                        label: a.store.to_string(),
                        value: a.rounded_up(),
                        store: Some(a.store.clone()),
                    })
                    .collect(),
            },
            slow_stores: slow_stores(&averages),
        }
    }

    /// Report over no rows at all.
    pub fn empty() -> Self {
        Self::build(&[], &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{record, ymd};

    fn with_days(store: i64, days: f64) -> InvoiceRecord {
        let mut r = record(store, "OK", ymd(2024, 1, 1));
        r.days_between = Some(days);
        r
    }

    fn issued(store: i64, number: &str, day: u32) -> InvoiceRecord {
        let mut r = record(store, "OK", ymd(2024, 1, 1));
        r.invoice_number = Some(number.to_string());
        r.issue_date = Some(ymd(2024, 1, day));
        r
    }

    #[test]
    fn store_counts_sum_to_row_count() {
        let rows = vec![
            record(3, "OK", ymd(2024, 1, 1)),
            record(1, "OK", ymd(2024, 1, 1)),
            record(3, "OK", ymd(2024, 1, 1)),
            record(2, "OK", ymd(2024, 1, 1)),
        ];
        let counts = count_by_store(&rows);
        assert_eq!(
            counts,
            vec![
                (StoreId::Number(1), 1),
                (StoreId::Number(2), 1),
                (StoreId::Number(3), 2)
            ]
        );
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), rows.len());
    }

    #[test]
    fn issue_day_counts_distinct_numbers_and_skips_missing_dates() {
        let mut undated = record(1, "OK", ymd(2024, 1, 1));
        undated.invoice_number = Some("900".into());
        let rows = vec![
            issued(1, "100", 5),
            issued(1, "100", 5),
            issued(2, "101", 5),
            issued(1, "102", 31),
            undated,
        ];
        assert_eq!(distinct_invoices_by_issue_day(&rows), vec![(5, 2), (31, 1)]);
    }

    #[test]
    fn blank_stores_and_invoice_numbers_are_not_groups() {
        let mut blank_number = issued(1, "", 5);
        blank_number.invoice_number = None;
        blank_number.days_between = Some(1.0);
        let mut blank_store = issued(1, "101", 5);
        blank_store.store = None;
        blank_store.days_between = Some(9.0);
        let mut first = issued(1, "100", 5);
        first.days_between = Some(1.0);
        let rows = vec![first, blank_number, blank_store];

        assert_eq!(distinct_invoices_by_issue_day(&rows), vec![(5, 2)]);
        assert_eq!(count_by_store(&rows), vec![(StoreId::Number(1), 2)]);
        let avg = average_days_by_store(&rows);
        assert_eq!(avg.len(), 1);
        assert_eq!(avg[0].mean_days, 1.0);
        assert!(slow_stores(&avg).is_empty());

        let report = Report::build(&rows, &[0, 1, 2]);
        assert_eq!(report.row_count, 3);
        assert_eq!(report.invoices_by_store.bars.len(), 1);
        assert_eq!(report.invoices_by_store.bars[0].label, "1");
    }

    #[test]
    fn averages_skip_blank_values() {
        let mut blank = record(1, "OK", ymd(2024, 1, 1));
        blank.days_between = None;
        let rows = vec![with_days(1, 2.0), with_days(1, 3.0), blank, record(2, "OK", ymd(2024, 1, 1))];
        let avg = average_days_by_store(&rows);
        assert_eq!(avg.len(), 1);
        assert_eq!(avg[0].store, StoreId::Number(1));
        assert_eq!(avg[0].mean_days, 2.5);
        assert_eq!(avg[0].samples, 2);
        assert_eq!(avg[0].rounded_up(), 3.0);
    }

    #[test]
    fn rounded_up_never_below_mean() {
        for mean in [0.0, 0.1, 1.0, 2.5, 3.9, 4.0, 7.01] {
            let a = StoreAverage {
                store: StoreId::Number(1),
                mean_days: mean,
                samples: 1,
            };
            assert!(a.rounded_up() >= a.mean_days);
            assert_eq!(a.rounded_up() == a.mean_days, mean.fract() == 0.0);
        }
    }

    #[test]
    fn slow_store_threshold_is_inclusive_at_four() {
        let rows = vec![with_days(1, 3.9), with_days(2, 4.0), with_days(3, 3.0), with_days(3, 6.0)];
        let slow = slow_stores(&average_days_by_store(&rows));
        let stores: Vec<StoreId> = slow.into_iter().map(|a| a.store).collect();
        assert_eq!(stores, vec![StoreId::Number(2), StoreId::Number(3)]);
    }

    #[test]
    fn report_uses_only_visible_rows() {
        let rows = vec![with_days(1, 5.0), with_days(2, 1.0), with_days(2, 2.0)];
        let report = Report::build(&rows, &[1, 2]);
        assert_eq!(report.row_count, 2);
        assert_eq!(report.invoices_by_store.bars.len(), 1);
        assert_eq!(report.invoices_by_store.bars[0].value, 2.0);
        assert_eq!(report.turnaround_by_store.bars[0].value, 2.0);
        assert!(report.slow_stores.is_empty());
    }

    #[test]
    fn empty_report_keeps_axis_labels() {
        let report = Report::empty();
        assert_eq!(report.row_count, 0);
        assert!(report.invoices_by_issue_day.bars.is_empty());
        assert_eq!(report.invoices_by_issue_day.x_label, "Day of month");
        assert!(report.slow_stores.is_empty());
    }
}
