use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

/// Default source directory and name pattern the dashboard scans.
const SOURCE_DIR: &str = "arquivos";
const SAMPLE_NAME: &str = "entrada_mercadoria_sample.xlsx";

fn output_path() -> PathBuf {
    PathBuf::from(SOURCE_DIR).join(SAMPLE_NAME)
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

fn excel_date(d: NaiveDate) -> Result<ExcelDateTime> {
    use chrono::Datelike;
    ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8)
        .with_context(|| format!("converting {d}"))
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let stores = [1, 2, 3, 5, 8, 13];
    let statuses = ["Conferido", "Pendente", "Divergente"];
    let suppliers = ["Distribuidora Sul", "Atacado Norte", "Laticinios Serra", "Bebidas Vale"];
    let month_start = NaiveDate::from_ymd_opt(2024, 3, 1).context("invalid start date")?;

    let headers = [
        "numero_loja",
        "descricao_status",
        "data_entrada",
        "data_emissao",
        "numero_nf",
        "dias_entre_datas",
        "fornecedor",
    ];

    let mut workbook = Workbook::new();
    let date_fmt = Format::new().set_num_format("dd/mm/yyyy");
    let sheet = workbook.add_worksheet();
    sheet.set_name("entradas")?;
    for (col, h) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *h)?;
    }

    let n_rows: u32 = 240;
    let mut invoice_number: u64 = 10_000;
    for row in 1..=n_rows {
        // Consecutive rows sometimes share an invoice (several lines per document).
        if rng.below(3) != 0 {
            invoice_number += 1;
        }

        let store = *rng.pick(&stores);
        // Store 8 is the slow one.
        let days = if store == 8 { 3 + rng.below(5) } else { rng.below(5) };
        let issued = month_start + Duration::days(rng.below(28) as i64);
        let entered = issued + Duration::days(days as i64);

        sheet.write_number(row, 0, store)?;
        sheet.write_string(row, 1, *rng.pick(&statuses))?;
        // A few rows lack the entry date or carry an unreadable issuance date.
        if row % 37 == 0 {
            sheet.write_string(row, 2, "")?;
        } else {
            sheet.write_datetime_with_format(row, 2, &excel_date(entered)?, &date_fmt)?;
        }
        if row % 53 == 0 {
            sheet.write_string(row, 3, "sem data")?;
        } else {
            sheet.write_datetime_with_format(row, 3, &excel_date(issued)?, &date_fmt)?;
        }
        sheet.write_number(row, 4, invoice_number as f64)?;
        sheet.write_number(row, 5, days as f64)?;
        sheet.write_string(row, 6, *rng.pick(&suppliers))?;
    }

    let output_path = output_path();
    std::fs::create_dir_all(SOURCE_DIR).with_context(|| format!("creating {SOURCE_DIR}"))?;
    workbook
        .save(&output_path)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!("Wrote {n_rows} invoice lines to {}", output_path.display());
    Ok(())
}
