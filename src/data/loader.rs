use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;

use super::model::{Field, Month, SalesDataset, SalesRecord};

/// Published copy of the historical automobile sales table.
pub const DEFAULT_SOURCE_URL: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/\
IBMDeveloperSkillsNetwork-DV0101EN-SkillsNetwork/Data%20Files/historical_automobile_sales.csv";

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the dataset is read from at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    /// `http://` / `https://` locations are fetched, anything else is a path.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(s.to_string())
        } else {
            DataSource::File(PathBuf::from(s))
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Url(DEFAULT_SOURCE_URL.to_string())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Parquet,
}

fn format_from_extension(ext: &str) -> Option<Format> {
    match ext.to_ascii_lowercase().as_str() {
        "csv" => Some(Format::Csv),
        "parquet" | "pq" => Some(Format::Parquet),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the dataset from wherever `source` points.
pub fn load_source(source: &DataSource) -> Result<SalesDataset> {
    match source {
        DataSource::Url(url) => load_url(url),
        DataSource::File(path) => load_file(path),
    }
}

/// Load a dataset from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming at least the dashboard columns
/// * `.parquet` – one column per dashboard field (numeric types are cast)
pub fn load_file(path: &Path) -> Result<SalesDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match format_from_extension(ext) {
        Some(Format::Csv) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV file {}", path.display()))?;
            read_csv(file)
        }
        Some(Format::Parquet) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening parquet file {}", path.display()))?;
            read_parquet(file)
        }
        None => bail!("Unsupported file extension: .{ext}"),
    }
}

/// Fetch the dataset over HTTP. The body is CSV unless the URL path ends in `.parquet`.
fn load_url(url: &str) -> Result<SalesDataset> {
    log::info!("Fetching dataset from {url}");
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .with_context(|| format!("fetching {url}"))?;
    let body = response.bytes().context("reading response body")?;
    log::debug!("Received {} bytes", body.len());

    match url_format(url) {
        Some(Format::Parquet) => read_parquet(body),
        _ => read_csv(&body[..]),
    }
}

/// Format implied by the last path segment of `url`, ignoring query and fragment.
fn url_format(url: &str) -> Option<Format> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = segment.rsplit_once('.')?;
    format_from_extension(ext)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one observation per row.
/// Columns other than the dashboard fields are ignored.
pub fn read_csv<R: Read>(input: R) -> Result<SalesDataset> {
    let mut reader = csv::Reader::from_reader(input);
    let mut records = Vec::new();

    for (row_no, result) in reader.deserialize::<SalesRecord>().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(record);
    }

    Ok(SalesDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet table with one column per dashboard field.
///
/// Integer columns may be any integer width and measures any numeric type;
/// both are cast before reading. Works with files written by **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
pub fn read_parquet<T: ChunkReader + 'static>(input: T) -> Result<SalesDataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        records.extend(records_from_batch(&batch, offset)?);
        offset += batch.num_rows();
    }

    Ok(SalesDataset::from_records(records))
}

fn records_from_batch(batch: &RecordBatch, offset: usize) -> Result<Vec<SalesRecord>> {
    let year = column_as(batch, Field::Year, &DataType::Int64)?;
    let month = column_as(batch, Field::Month, &DataType::Utf8)?;
    let recession = column_as(batch, Field::Recession, &DataType::Int64)?;
    let vehicle_type = column_as(batch, Field::VehicleType, &DataType::Utf8)?;
    let sales = column_as(batch, Field::AutomobileSales, &DataType::Float64)?;
    let advertising = column_as(batch, Field::AdvertisingExpenditure, &DataType::Float64)?;
    let unemployment = column_as(batch, Field::UnemploymentRate, &DataType::Float64)?;

    let columns: [&ArrayRef; 7] = [
        &year,
        &month,
        &recession,
        &vehicle_type,
        &sales,
        &advertising,
        &unemployment,
    ];

    let year = year.as_primitive::<Int64Type>();
    let month = month.as_string::<i32>();
    let recession = recession.as_primitive::<Int64Type>();
    let vehicle_type = vehicle_type.as_string::<i32>();
    let sales = sales.as_primitive::<Float64Type>();
    let advertising = advertising.as_primitive::<Float64Type>();
    let unemployment = unemployment.as_primitive::<Float64Type>();

    let mut records = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let row_no = offset + row;
        if columns.iter().any(|c| c.is_null(row)) {
            bail!("Parquet row {row_no}: null value in a required column");
        }
        records.push(SalesRecord {
            year: i32::try_from(year.value(row))
                .with_context(|| format!("Parquet row {row_no}: year out of range"))?,
            month: month
                .value(row)
                .parse::<Month>()
                .with_context(|| format!("Parquet row {row_no}"))?,
            recession: u8::try_from(recession.value(row))
                .with_context(|| format!("Parquet row {row_no}: recession flag out of range"))?,
            vehicle_type: vehicle_type.value(row).to_string(),
            automobile_sales: sales.value(row),
            advertising_expenditure: advertising.value(row),
            unemployment_rate: unemployment.value(row),
        });
    }
    Ok(records)
}

/// Look up a column by its source name and cast it to `to`.
fn column_as(batch: &RecordBatch, field: Field, to: &DataType) -> Result<ArrayRef> {
    let col = batch
        .column_by_name(field.column_name())
        .with_context(|| format!("Parquet file missing '{field}' column"))?;
    cast(col, to).with_context(|| format!("column '{field}' cannot be read as {to:?}"))
}
