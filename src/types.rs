use std::collections::BTreeMap;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Feature properties as they appear in the source file. Everything other
/// than the region name is kept as raw JSON so the loader can decide which
/// attributes are year columns.
#[derive(Debug, Deserialize)]
pub struct RawProperties {
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// One row of the wide source table: a region boundary plus one rainfall
/// mean per year column.
#[derive(Debug, Clone)]
pub struct RegionGeometry {
    pub region: String,
    pub boundary: MultiPolygon<f64>,
    pub columns: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionYearRecord {
    #[serde(rename = "State")]
    pub region: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Rainfall (mm)")]
    pub rainfall_mm: f64,
}

#[derive(Debug, Tabled, Clone)]
pub struct RankedRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "State")]
    pub region: String,
    #[tabled(rename = "Rainfall (mm)")]
    pub rainfall: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct SeriesRow {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Rainfall (mm)")]
    pub rainfall: String,
    #[tabled(rename = "")]
    pub bar: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct ClassRow {
    #[tabled(rename = "Class")]
    pub class: usize,
    #[tabled(rename = "Range (mm)")]
    pub range: String,
    #[tabled(rename = "Color")]
    pub color: String,
    #[tabled(rename = "States")]
    pub regions: usize,
}

#[derive(Debug, Tabled, Clone)]
pub struct PopupRow {
    #[tabled(rename = "State")]
    pub region: String,
    #[tabled(rename = "Rainfall (mm)")]
    pub rainfall: String,
    #[tabled(rename = "Class")]
    pub class: usize,
    #[tabled(rename = "Centroid (lon, lat)")]
    pub centroid: String,
}

/// Exported snapshot of the views computed for one year.
#[derive(Debug, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub regions: usize,
    pub national_mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub top: Vec<RegionYearRecord>,
    pub bottom: Vec<RegionYearRecord>,
}
