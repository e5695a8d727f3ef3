// Static configuration for the dashboard.
//
// Everything the loader and the views need to know about the dataset layout
// lives here so the rest of the code never hard-codes file names or years.
use std::ops::RangeInclusive;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "Annual Precipitation_2014_to_2024.geojson";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub first_year: i32,
    pub last_year: i32,
    /// Suffix appended to a year to form its attribute name, e.g. `2014_mean`.
    pub column_suffix: String,
    pub rank_size: usize,
    pub map_classes: usize,
    pub long_form_export: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            first_year: 2014,
            last_year: 2024,
            column_suffix: "_mean".to_string(),
            rank_size: 3,
            map_classes: 5,
            long_form_export: PathBuf::from("rainfall_long_form.csv"),
        }
    }
}

impl Config {
    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    /// Attribute names of the per-year columns, in year order.
    pub fn year_columns(&self) -> Vec<String> {
        self.years()
            .map(|year| format!("{}{}", year, self.column_suffix))
            .collect()
    }

    pub fn summary_export(&self, year: i32) -> PathBuf {
        PathBuf::from(format!("rainfall_summary_{}.json", year))
    }
}
