use std::collections::BTreeMap;

use super::model::{Field, FieldValue, SalesRecord};

// ---------------------------------------------------------------------------
// Group-by primitives
// ---------------------------------------------------------------------------

/// Running accumulator for one group.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

/// Partition `rows` by distinct `key` and accumulate `value` per partition.
/// Rows whose `value` column is not numeric contribute nothing.
fn accumulate<'a, I>(rows: I, key: Field, value: Field) -> BTreeMap<FieldValue, Accumulator>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut groups: BTreeMap<FieldValue, Accumulator> = BTreeMap::new();
    for row in rows {
        let Some(v) = row.measure(value) else {
            continue;
        };
        let acc = groups.entry(row.value(key)).or_default();
        acc.sum += v;
        acc.count += 1;
    }
    groups
}

/// Mean of `value` per distinct `key`, ascending by key.
pub fn group_mean<'a, I>(rows: I, key: Field, value: Field) -> Vec<(FieldValue, f64)>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    accumulate(rows, key, value)
        .into_iter()
        .map(|(k, acc)| (k, acc.sum / acc.count as f64))
        .collect()
}

/// Sum of `value` per distinct `key`, ascending by key.
pub fn group_sum<'a, I>(rows: I, key: Field, value: Field) -> Vec<(FieldValue, f64)>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    accumulate(rows, key, value)
        .into_iter()
        .map(|(k, acc)| (k, acc.sum))
        .collect()
}

/// Raw `(x, y)` points split into one series per distinct `color` value.
///
/// Series are ascending by colour key; points keep dataset order.
pub fn split_by<'a, I>(rows: I, color: Field, x: Field, y: Field) -> Vec<(FieldValue, Vec<(FieldValue, f64)>)>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut series: BTreeMap<FieldValue, Vec<(FieldValue, f64)>> = BTreeMap::new();
    for row in rows {
        let Some(v) = row.measure(y) else {
            continue;
        };
        series
            .entry(row.value(color))
            .or_default()
            .push((row.value(x), v));
    }
    series.into_iter().collect()
}
