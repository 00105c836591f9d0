/// Data layer: source selection, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  arquivos/entrada_mercadoria_*.xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  newest matching file by mtime
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse sheet → validate schema → InvoiceDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  store / status / date window → visible indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  per-store counts, per-day distinct invoices, averages
///   └───────────┘
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod source;
