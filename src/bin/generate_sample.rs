//! Writes a synthetic automobile sales table for offline use.
//!
//! Usage: `generate_sample [OUTPUT]` (default `historical_automobile_sales.csv`).
//! A `.parquet` extension writes Parquet instead of CSV.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use auto_sales_dashboard::data::model::{Month, SalesRecord};
use auto_sales_dashboard::report::YEAR_RANGE;
use parquet::arrow::ArrowWriter;

const RECESSION_YEARS: [i32; 10] = [1980, 1981, 1982, 1991, 2000, 2001, 2007, 2008, 2009, 2020];

/// (name, base monthly sales, base advertising spend)
const VEHICLES: [(&str, f64, f64); 5] = [
    ("Supperminicar", 2800.0, 2500.0),
    ("Smallfamiliycar", 2400.0, 2200.0),
    ("Mediumfamilycar", 2000.0, 2000.0),
    ("Executivecar", 900.0, 3000.0),
    ("Sports", 600.0, 3500.0),
];

/// Deterministic SplitMix64 stream, so reruns write the same table.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + (hi - lo) * unit
    }

    fn pick(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

fn generate(rng: &mut SampleRng) -> Vec<SalesRecord> {
    let mut records = Vec::new();
    for year in YEAR_RANGE {
        let recession = RECESSION_YEARS.contains(&year);
        // Slow upward trend over the period.
        let trend = 1.0 + f64::from(year - YEAR_RANGE.start()) * 0.01;
        for month in Month::ALL {
            let (vehicle_type, base_sales, base_adv) = VEHICLES[rng.pick(VEHICLES.len())];
            let seasonal = 1.0 + 0.1 * (f64::from(month.number()) / 12.0 * std::f64::consts::TAU).sin();
            let (damp, unemployment) = if recession {
                (rng.range(0.35, 0.6), rng.range(4.5, 10.0))
            } else {
                (rng.range(0.85, 1.15), rng.range(1.5, 4.5))
            };
            records.push(SalesRecord {
                year,
                month,
                recession: u8::from(recession),
                vehicle_type: vehicle_type.to_string(),
                automobile_sales: (base_sales * trend * seasonal * damp * 10.0).round() / 10.0,
                advertising_expenditure: (base_adv * rng.range(0.5, 1.5)).round(),
                unemployment_rate: (unemployment * 10.0).round() / 10.0,
            });
        }
    }
    records
}

fn write_csv(path: &Path, records: &[SalesRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for record in records {
        writer.serialize(record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, records: &[SalesRecord]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Year", DataType::Int64, false),
        Field::new("Month", DataType::Utf8, false),
        Field::new("Recession", DataType::Int64, false),
        Field::new("Vehicle_Type", DataType::Utf8, false),
        Field::new("Automobile_Sales", DataType::Float64, false),
        Field::new("Advertising_Expenditure", DataType::Float64, false),
        Field::new("unemployment_rate", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(records.iter().map(|r| i64::from(r.year)))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.month.label()))),
            Arc::new(Int64Array::from_iter_values(records.iter().map(|r| i64::from(r.recession)))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.vehicle_type.as_str()))),
            Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.automobile_sales))),
            Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.advertising_expenditure))),
            Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.unemployment_rate))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "historical_automobile_sales.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SampleRng(42);
    let records = generate(&mut rng);

    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(path, &records)?;
    } else {
        write_csv(path, &records)?;
    }

    println!("Wrote {} rows to {output}", records.len());
    Ok(())
}
