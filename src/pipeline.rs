// Reshaping and selection queries behind every dashboard view.
//
// All functions here are total over their inputs: an empty selection comes
// back as an empty `Vec` or `None`, never as an error. Only the reshaping
// step can fail, and only on a structurally broken table.
use std::collections::BTreeSet;

use crate::config::Config;
use crate::error::DataError;
use crate::types::{RegionGeometry, RegionYearRecord};
use crate::util::{average, round_to};

/// Extract the year from an attribute name such as `2014_mean`.
pub fn parse_year_column(column: &str, suffix: &str) -> Result<i32, DataError> {
    column
        .strip_suffix(suffix)
        .and_then(|token| token.trim().parse::<i32>().ok())
        .ok_or_else(|| DataError::MalformedColumn(column.to_string()))
}

/// Reshape the wide table into one record per (region, year) for every
/// year in the configured range.
pub fn to_long_form(
    regions: &[RegionGeometry],
    config: &Config,
) -> Result<Vec<RegionYearRecord>, DataError> {
    to_long_form_columns(regions, &config.year_columns(), &config.column_suffix)
}

/// Same as [`to_long_form`] for an explicit list of value columns.
///
/// Records come out column-major: every region for the first column, then
/// every region for the next, so a year slice keeps the source row order.
pub fn to_long_form_columns(
    regions: &[RegionGeometry],
    columns: &[String],
    suffix: &str,
) -> Result<Vec<RegionYearRecord>, DataError> {
    let years = columns
        .iter()
        .map(|column| parse_year_column(column, suffix))
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(regions.len() * columns.len());
    for (column, year) in columns.iter().zip(years) {
        for region in regions {
            let rainfall_mm = region.columns.get(column).copied().ok_or_else(|| {
                DataError::unavailable(
                    format!("state {}", region.region),
                    format!("missing or non-numeric column {}", column),
                )
            })?;
            records.push(RegionYearRecord {
                region: region.region.clone(),
                year,
                rainfall_mm,
            });
        }
    }
    Ok(records)
}

pub fn distinct_years(records: &[RegionYearRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    years.into_iter().collect()
}

pub fn distinct_regions(records: &[RegionYearRecord]) -> Vec<String> {
    let regions: BTreeSet<&str> = records.iter().map(|r| r.region.as_str()).collect();
    regions.into_iter().map(str::to_string).collect()
}

pub fn slice_by_year(records: &[RegionYearRecord], year: i32) -> Vec<RegionYearRecord> {
    records.iter().filter(|r| r.year == year).cloned().collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extremes {
    /// Largest values first.
    pub top: Vec<RegionYearRecord>,
    /// Smallest values first.
    pub bottom: Vec<RegionYearRecord>,
}

/// The `k` wettest and `k` driest rows of a slice.
///
/// Both sorts are stable, so equal values keep their slice order. A slice
/// shorter than `k` yields all of its rows on each side.
pub fn rank_extremes(slice: &[RegionYearRecord], k: usize) -> Extremes {
    let mut top = slice.to_vec();
    top.sort_by(|a, b| b.rainfall_mm.total_cmp(&a.rainfall_mm));
    top.truncate(k);

    let mut bottom = slice.to_vec();
    bottom.sort_by(|a, b| a.rainfall_mm.total_cmp(&b.rainfall_mm));
    bottom.truncate(k);

    Extremes { top, bottom }
}

/// Unweighted mean rounded to 3 decimals; `None` when the slice is empty.
pub fn national_mean(slice: &[RegionYearRecord]) -> Option<f64> {
    let values: Vec<f64> = slice.iter().map(|r| r.rainfall_mm).collect();
    average(&values).map(|mean| round_to(mean, 3))
}

pub fn series_for_region(records: &[RegionYearRecord], region: &str) -> Vec<RegionYearRecord> {
    let mut series: Vec<RegionYearRecord> = records
        .iter()
        .filter(|r| r.region == region)
        .cloned()
        .collect();
    series.sort_by_key(|r| r.year);
    series
}

/// Everything the year-driven views need, computed in one pass over the
/// selection.
#[derive(Debug, Clone)]
pub struct YearView {
    pub year: i32,
    pub slice: Vec<RegionYearRecord>,
    pub extremes: Extremes,
    pub national_mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl YearView {
    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }
}

pub fn year_view(records: &[RegionYearRecord], year: i32, k: usize) -> YearView {
    let slice = slice_by_year(records, year);
    log::debug!("year {} selected: {} rows", year, slice.len());
    let extremes = rank_extremes(&slice, k);
    let national_mean = national_mean(&slice);
    let min = slice.iter().map(|r| r.rainfall_mm).reduce(f64::min);
    let max = slice.iter().map(|r| r.rainfall_mm).reduce(f64::max);
    YearView {
        year,
        slice,
        extremes,
        national_mean,
        min,
        max,
    }
}
