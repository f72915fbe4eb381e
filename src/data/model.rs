use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Month – calendar month label of a row
// ---------------------------------------------------------------------------

/// Calendar month. Ordering is calendar order, not alphabetical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }
}

impl FromStr for Month {
    type Err = ParseError;

    /// Accepts three-letter abbreviations and full names, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        Month::ALL
            .into_iter()
            .find(|m| {
                let abbrev = m.label().to_ascii_lowercase();
                lower.len() >= 3 && lower.starts_with(&abbrev) && full_name(*m).starts_with(&lower)
            })
            .ok_or_else(|| ParseError::UnknownMonth(trimmed.to_string()))
    }
}

fn full_name(m: Month) -> &'static str {
    match m {
        Month::Jan => "january",
        Month::Feb => "february",
        Month::Mar => "march",
        Month::Apr => "april",
        Month::May => "may",
        Month::Jun => "june",
        Month::Jul => "july",
        Month::Aug => "august",
        Month::Sep => "september",
        Month::Oct => "october",
        Month::Nov => "november",
        Month::Dec => "december",
    }
}

impl TryFrom<String> for Month {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(m: Month) -> Self {
        m.label().to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Field – a named column of the dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Year,
    Month,
    Recession,
    VehicleType,
    AutomobileSales,
    AdvertisingExpenditure,
    UnemploymentRate,
}

impl Field {
    /// Column header as it appears in the source file.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Year => "Year",
            Field::Month => "Month",
            Field::Recession => "Recession",
            Field::VehicleType => "Vehicle_Type",
            Field::AutomobileSales => "Automobile_Sales",
            Field::AdvertisingExpenditure => "Advertising_Expenditure",
            Field::UnemploymentRate => "unemployment_rate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// FieldValue – a single cell used as a group key or chart x value
// ---------------------------------------------------------------------------

/// A typed cell value. Used as a `BTreeMap` key downstream, so it must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Month(Month),
    Text(String),
}

// -- Manual Eq/Ord so we can group by FieldValue --

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Integer(_) => 0,
                Float(_) => 1,
                Month(_) => 2,
                Text(_) => 3,
            }
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Month(a), Month(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::Month(m) => m.hash(state),
            FieldValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Month(m) => write!(f, "{m}"),
            FieldValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl FieldValue {
    /// Numeric position on a continuous axis, if the value has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SalesRecord – one row of the source table
// ---------------------------------------------------------------------------

/// One monthly observation. Columns not named here are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: Month,
    #[serde(rename = "Recession")]
    pub recession: u8,
    #[serde(rename = "Vehicle_Type")]
    pub vehicle_type: String,
    #[serde(rename = "Automobile_Sales")]
    pub automobile_sales: f64,
    #[serde(rename = "Advertising_Expenditure")]
    pub advertising_expenditure: f64,
    #[serde(rename = "unemployment_rate")]
    pub unemployment_rate: f64,
}

impl SalesRecord {
    pub fn is_recession(&self) -> bool {
        self.recession == 1
    }

    /// Value of `field` in this row.
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Year => FieldValue::Integer(i64::from(self.year)),
            Field::Month => FieldValue::Month(self.month),
            Field::Recession => FieldValue::Integer(i64::from(self.recession)),
            Field::VehicleType => FieldValue::Text(self.vehicle_type.clone()),
            Field::AutomobileSales => FieldValue::Float(self.automobile_sales),
            Field::AdvertisingExpenditure => FieldValue::Float(self.advertising_expenditure),
            Field::UnemploymentRate => FieldValue::Float(self.unemployment_rate),
        }
    }

    /// Numeric value of `field`; `None` for categorical columns.
    pub fn measure(&self, field: Field) -> Option<f64> {
        match field {
            Field::AutomobileSales => Some(self.automobile_sales),
            Field::AdvertisingExpenditure => Some(self.advertising_expenditure),
            Field::UnemploymentRate => Some(self.unemployment_rate),
            Field::Year => Some(f64::from(self.year)),
            Field::Recession => Some(f64::from(self.recession)),
            Field::Month | Field::VehicleType => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed category indices.
/// Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    records: Vec<SalesRecord>,
    years: BTreeSet<i32>,
    vehicle_types: BTreeSet<String>,
}

impl SalesDataset {
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let years = records.iter().map(|r| r.year).collect();
        let vehicle_types = records.iter().map(|r| r.vehicle_type.clone()).collect();
        SalesDataset {
            records,
            years,
            vehicle_types,
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Distinct vehicle types present, ascending.
    pub fn vehicle_types(&self) -> &BTreeSet<String> {
        &self.vehicle_types
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parses_abbreviations_and_full_names() {
        assert_eq!("Jan".parse::<Month>().unwrap(), Month::Jan);
        assert_eq!("sep".parse::<Month>().unwrap(), Month::Sep);
        assert_eq!("December".parse::<Month>().unwrap(), Month::Dec);
        assert_eq!(" Sept ".parse::<Month>().unwrap(), Month::Sep);
        assert!(matches!("Ja".parse::<Month>(), Err(ParseError::UnknownMonth(_))));
        assert!("Janx".parse::<Month>().is_err());
        assert_eq!(Month::Mar.number(), 3);
    }

    #[test]
    fn field_values_order_naturally() {
        assert!(FieldValue::Month(Month::Feb) < FieldValue::Month(Month::Oct));
        assert!(FieldValue::Integer(1980) < FieldValue::Integer(2023));
        assert!(FieldValue::Float(-0.5) < FieldValue::Float(2.0));
        assert!(FieldValue::Text("Executivecar".into()) < FieldValue::Text("Sports".into()));
    }

    #[test]
    fn dataset_indexes_distinct_categories() {
        let mk = |year, vt: &str| SalesRecord {
            year,
            month: Month::Jan,
            recession: 0,
            vehicle_type: vt.to_string(),
            automobile_sales: 1.0,
            advertising_expenditure: 1.0,
            unemployment_rate: 1.0,
        };
        let ds = SalesDataset::from_records(vec![mk(1981, "Sports"), mk(1980, "Sports"), mk(1981, "Executivecar")]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.years().iter().copied().collect::<Vec<_>>(), vec![1980, 1981]);
        assert_eq!(
            ds.vehicle_types().iter().cloned().collect::<Vec<_>>(),
            vec!["Executivecar".to_string(), "Sports".to_string()]
        );
    }
}
