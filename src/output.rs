use std::path::Path;

use geo::Centroid;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::classify::{class_color, classify_year, gauge, MapClasses};
use crate::error::ExportError;
use crate::loader::Dataset;
use crate::pipeline::YearView;
use crate::types::{ClassRow, PopupRow, RankedRow, RegionYearRecord, SeriesRow, YearSummary};
use crate::util::format_number;

pub const NO_DATA: &str = "No data";

const BAR_WIDTH: f64 = 30.0;

pub const INFO_TITLE: &str = "Dashboard Information";

pub const INFO_TEXT: &str = "\
About This Dashboard

This dashboard provides an interactive view of rainfall patterns across
Nigeria between 2014 and 2024. The data was derived and processed in Google
Earth Engine, then aggregated per state. It shows spatial and temporal
rainfall analytics across the country, with the aim of promoting water
accountability and sustainable water resource management in each region.

Key features include:
- Map classification of every state for the selected year
- Top and bottom 3 states in terms of rainfall volume for each year
- Annual rainfall series per state
- Average national rainfall for the selected year

Author

Created by Ihomon Msugh-Aondo, Geoscientist & Geospatial Analyst.";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table, or the empty-state message when there is nothing to show.
pub fn render_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return NO_DATA.to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn ranked_rows(records: &[RegionYearRecord]) -> Vec<RankedRow> {
    records
        .iter()
        .enumerate()
        .map(|(idx, r)| RankedRow {
            rank: idx + 1,
            region: r.region.clone(),
            rainfall: format_number(r.rainfall_mm, 3),
        })
        .collect()
}

/// Series rows with a bar scaled against the wettest year of the series.
pub fn series_rows(series: &[RegionYearRecord]) -> Vec<SeriesRow> {
    let max = series.iter().map(|r| r.rainfall_mm).fold(0.0, f64::max);
    series
        .iter()
        .map(|r| {
            let len = if max > 0.0 {
                ((r.rainfall_mm / max) * BAR_WIDTH).round().max(0.0) as usize
            } else {
                0
            };
            SeriesRow {
                year: r.year,
                rainfall: format_number(r.rainfall_mm, 3),
                bar: "█".repeat(len),
            }
        })
        .collect()
}

pub fn render_extremes(view: &YearView, k: usize) -> String {
    format!(
        "Top {}\n{}\n\nBottom {}\n{}",
        k,
        render_table(&ranked_rows(&view.extremes.top)),
        k,
        render_table(&ranked_rows(&view.extremes.bottom)),
    )
}

pub fn render_gauge(view: &YearView) -> String {
    let value = match gauge(view) {
        Some(g) => format!(
            "{} mm  (fill {}, label {})",
            format_number(g.value, 3),
            g.fill,
            g.label
        ),
        None => NO_DATA.to_string(),
    };
    format!(
        "{}\nNigeria's Average Rainfall Level in {}",
        value, view.year
    )
}

pub fn class_rows(view: &YearView, classes: &MapClasses) -> Vec<ClassRow> {
    let Some(min) = view.min else {
        return Vec::new();
    };
    let count = classes.breaks.len();
    classes
        .breaks
        .iter()
        .enumerate()
        .map(|(idx, upper)| {
            let lower = if idx == 0 { min } else { classes.breaks[idx - 1] };
            ClassRow {
                class: idx + 1,
                range: format!("{} - {}", format_number(lower, 1), format_number(*upper, 1)),
                color: class_color(idx, count),
                regions: classes.count_in(idx),
            }
        })
        .collect()
}

pub fn popup_rows(view: &YearView, classes: &MapClasses, dataset: &Dataset) -> Vec<PopupRow> {
    view.slice
        .iter()
        .zip(&classes.assignments)
        .map(|(r, class)| {
            let centroid = dataset
                .geometry(&r.region)
                .and_then(|g| g.boundary.centroid())
                .map(|p| format!("{:.3}, {:.3}", p.x(), p.y()))
                .unwrap_or_else(|| "-".to_string());
            PopupRow {
                region: r.region.clone(),
                rainfall: format_number(r.rainfall_mm, 3),
                class: class + 1,
                centroid,
            }
        })
        .collect()
}

pub fn render_map(view: &YearView, dataset: &Dataset, k: usize) -> String {
    let classes = classify_year(view, k);
    let mut out = format!("Rainfall (mm) {} - natural breaks, {} classes\n", view.year, k);
    if let Some(extent) = dataset.extent() {
        let center = extent.center();
        out.push_str(&format!(
            "Extent: lon {:.3}..{:.3}, lat {:.3}..{:.3} (center {:.3}, {:.3})\n",
            extent.min().x,
            extent.max().x,
            extent.min().y,
            extent.max().y,
            center.x,
            center.y
        ));
    }
    out.push('\n');
    out.push_str(&render_table(&class_rows(view, &classes)));
    out.push_str("\n\n");
    out.push_str(&render_table(&popup_rows(view, &classes, dataset)));
    out
}

pub fn render_series(region: &str, series: &[RegionYearRecord]) -> String {
    format!("Rainfall (mm) for {}\n{}", region, render_table(&series_rows(series)))
}

pub fn year_summary(view: &YearView) -> YearSummary {
    YearSummary {
        year: view.year,
        regions: view.slice.len(),
        national_mean: view.national_mean,
        min: view.min,
        max: view.max,
        top: view.extremes.top.clone(),
        bottom: view.extremes.bottom.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::tests::region;
    use crate::pipeline::year_view;

    fn dataset() -> Dataset {
        let config = Config {
            first_year: 2014,
            last_year: 2015,
            ..Config::default()
        };
        let regions = vec![
            region("A", &[(2014, 100.0), (2015, 150.0)]),
            region("B", &[(2014, 200.0), (2015, 50.0)]),
            region("C", &[(2014, 300.0), (2015, 300.0)]),
        ];
        Dataset::from_regions(regions, &config).unwrap()
    }

    #[test]
    fn empty_rows_render_no_data() {
        let rows: Vec<RankedRow> = Vec::new();
        assert_eq!(render_table(&rows), NO_DATA);
    }

    #[test]
    fn empty_year_renders_no_data_everywhere() {
        let dataset = dataset();
        let view = year_view(dataset.records(), 1999, 3);
        let extremes = render_extremes(&view, 3);
        assert_eq!(extremes.matches(NO_DATA).count(), 2);
        assert!(render_gauge(&view).starts_with(NO_DATA));
        let map = render_map(&view, &dataset, 5);
        assert_eq!(map.matches(NO_DATA).count(), 2);
    }

    #[test]
    fn extremes_table_lists_states_in_rank_order() {
        let dataset = dataset();
        let view = year_view(dataset.records(), 2014, 3);
        let rows = ranked_rows(&view.extremes.top);
        let names: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].rainfall, "300.000");
        assert!(render_extremes(&view, 3).contains("| C "));
    }

    #[test]
    fn gauge_shows_the_rounded_mean() {
        let dataset = dataset();
        let view = year_view(dataset.records(), 2014, 3);
        let text = render_gauge(&view);
        assert!(text.starts_with("200.000 mm"));
        assert!(text.ends_with("Nigeria's Average Rainfall Level in 2014"));
    }

    #[test]
    fn series_bars_scale_to_the_wettest_year() {
        let series = vec![
            RegionYearRecord { region: "A".into(), year: 2014, rainfall_mm: 100.0 },
            RegionYearRecord { region: "A".into(), year: 2015, rainfall_mm: 50.0 },
        ];
        let rows = series_rows(&series);
        assert_eq!(rows[0].bar.chars().count(), 30);
        assert_eq!(rows[1].bar.chars().count(), 15);
        assert!(render_series("A", &[]).ends_with(NO_DATA));
    }

    #[test]
    fn map_legend_counts_every_state() {
        let dataset = dataset();
        let view = year_view(dataset.records(), 2014, 3);
        let classes = classify_year(&view, 5);
        let rows = class_rows(&view, &classes);
        assert_eq!(rows.iter().map(|r| r.regions).sum::<usize>(), 3);
        let popups = popup_rows(&view, &classes, &dataset);
        assert_eq!(popups.len(), 3);
        assert_eq!(popups[0].centroid, "-");
    }

    #[test]
    fn exports_round_trip_through_disk() {
        let dataset = dataset();
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("long.csv");
        write_csv(&csv_path, dataset.records()).unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("State,Year,Rainfall (mm)"));
        assert_eq!(lines.count(), 6);

        let json_path = dir.path().join("summary.json");
        let view = year_view(dataset.records(), 2015, 3);
        write_json(&json_path, &year_summary(&view)).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["year"], 2015);
        assert_eq!(value["top"][0]["State"], "C");
        assert_eq!(value["bottom"][0]["State"], "B");
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("summary.json");
        assert!(matches!(
            write_json(&path, &serde_json::json!({})),
            Err(ExportError::Io(_))
        ));
    }
}
