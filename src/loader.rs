use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use geo::{BoundingRect, MultiPolygon, Rect};
use geojson::{Feature, GeoJson};

use crate::config::Config;
use crate::error::DataError;
use crate::pipeline::{distinct_regions, distinct_years, to_long_form};
use crate::types::{RawProperties, RegionGeometry, RegionYearRecord};
use crate::util::parse_f64_safe;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub features: usize,
    pub regions: usize,
    pub years: usize,
    pub records: usize,
}

/// The source table and everything derived from it at startup.
///
/// Built once by [`load`] and handed to every query by reference; nothing
/// in it changes for the lifetime of the process.
#[derive(Debug)]
pub struct Dataset {
    regions: Vec<RegionGeometry>,
    records: Vec<RegionYearRecord>,
    years: Vec<i32>,
    region_names: Vec<String>,
}

impl Dataset {
    pub fn from_regions(regions: Vec<RegionGeometry>, config: &Config) -> Result<Self, DataError> {
        let records = to_long_form(&regions, config)?;
        let years = distinct_years(&records);
        let region_names = distinct_regions(&records);
        if region_names.len() < regions.len() {
            log::warn!(
                "{} features share a state name with another feature",
                regions.len() - region_names.len()
            );
        }
        Ok(Self {
            regions,
            records,
            years,
            region_names,
        })
    }

    pub fn records(&self) -> &[RegionYearRecord] {
        &self.records
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Distinct region names, ascending.
    pub fn region_names(&self) -> &[String] {
        &self.region_names
    }

    pub fn geometry(&self, region: &str) -> Option<&RegionGeometry> {
        self.regions.iter().find(|g| g.region == region)
    }

    /// Bounding box of all region boundaries.
    pub fn extent(&self) -> Option<Rect<f64>> {
        self.regions
            .iter()
            .filter_map(|g| g.boundary.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                    (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
                )
            })
    }
}

/// Read the configured GeoJSON file and build the dataset.
pub fn load(config: &Config) -> Result<(Dataset, LoadReport), DataError> {
    let origin = config.data_path.display().to_string();
    log::info!("Loading rainfall dataset from {}", origin);
    let file = File::open(&config.data_path)
        .map_err(|e| DataError::unavailable(&origin, e.to_string()))?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .map_err(|e| DataError::unavailable(&origin, e.to_string()))?;
    read_dataset(geojson, &origin, config)
}

/// Build the dataset from an already parsed document. `origin` names the
/// source in error messages.
pub fn read_dataset(
    geojson: GeoJson,
    origin: &str,
    config: &Config,
) -> Result<(Dataset, LoadReport), DataError> {
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(DataError::unavailable(origin, "expected a FeatureCollection"));
    };
    let features = collection.features.len();
    if features == 0 {
        return Err(DataError::unavailable(origin, "no features"));
    }

    let regions = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| read_region(index, feature, origin))
        .collect::<Result<Vec<_>, _>>()?;

    let dataset = Dataset::from_regions(regions, config)?;
    let report = LoadReport {
        features,
        regions: dataset.region_names().len(),
        years: dataset.years().len(),
        records: dataset.records().len(),
    };
    log::info!(
        "Loaded {} states x {} years ({} records)",
        report.regions,
        report.years,
        report.records
    );
    Ok((dataset, report))
}

fn read_region(index: usize, feature: Feature, origin: &str) -> Result<RegionGeometry, DataError> {
    let geometry = feature
        .geometry
        .ok_or_else(|| DataError::unavailable(origin, format!("feature {} has no geometry", index)))?;
    let geometry = geo::Geometry::<f64>::try_from(geometry).map_err(|e| {
        DataError::unavailable(origin, format!("feature {}: unreadable geometry: {}", index, e))
    })?;
    let boundary = match geometry {
        geo::Geometry::MultiPolygon(mp) => mp,
        geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
        _ => {
            return Err(DataError::unavailable(
                origin,
                format!("feature {}: expected Polygon or MultiPolygon geometry", index),
            ))
        }
    };

    let properties = feature.properties.unwrap_or_default();
    let raw: RawProperties = serde_json::from_value(serde_json::Value::Object(properties))
        .map_err(|e| DataError::unavailable(origin, format!("feature {}: {}", index, e)))?;
    let region = raw
        .state
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DataError::unavailable(origin, format!("feature {} has no State", index)))?;

    let columns: BTreeMap<String, f64> = raw
        .attributes
        .iter()
        .filter_map(|(name, value)| numeric_value(value).map(|v| (name.clone(), v)))
        .collect();

    Ok(RegionGeometry {
        region,
        boundary,
        columns,
    })
}

/// Attribute values are usually JSON numbers; numeric strings are accepted
/// as well since spreadsheet exports sometimes quote them.
fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_f64_safe(Some(s)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Write;

    fn square(x: f64, y: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0], [x, y]]]
        })
    }

    fn feature(state: &str, geometry: Value, values: &[(i32, Value)]) -> Value {
        let mut properties = serde_json::Map::new();
        properties.insert("State".to_string(), json!(state));
        properties.insert("Shape_Area".to_string(), json!(1.25));
        for (year, value) in values {
            properties.insert(format!("{}_mean", year), value.clone());
        }
        json!({ "type": "Feature", "geometry": geometry, "properties": properties })
    }

    fn collection(features: Vec<Value>) -> GeoJson {
        let doc = json!({ "type": "FeatureCollection", "features": features });
        doc.to_string().parse().unwrap()
    }

    fn config() -> Config {
        Config {
            first_year: 2014,
            last_year: 2015,
            ..Config::default()
        }
    }

    fn sample() -> GeoJson {
        collection(vec![
            feature("Lagos", square(3.0, 6.0), &[(2014, json!(1650.2)), (2015, json!(1702.9))]),
            feature("Kano", square(8.0, 11.0), &[(2014, json!(712.4)), (2015, json!("698.0"))]),
        ])
    }

    #[test]
    fn reads_regions_and_reshapes() {
        let (dataset, report) = read_dataset(sample(), "memory", &config()).unwrap();
        assert_eq!(report.features, 2);
        assert_eq!(report.regions, 2);
        assert_eq!(report.years, 2);
        assert_eq!(report.records, 4);
        assert_eq!(dataset.years(), &[2014, 2015]);
        assert_eq!(dataset.region_names(), &["Kano".to_string(), "Lagos".to_string()]);
        let kano_2015 = dataset
            .records()
            .iter()
            .find(|r| r.region == "Kano" && r.year == 2015)
            .unwrap();
        assert_eq!(kano_2015.rainfall_mm, 698.0);
    }

    #[test]
    fn polygons_become_multipolygons() {
        let (dataset, _) = read_dataset(sample(), "memory", &config()).unwrap();
        let lagos = dataset.geometry("Lagos").unwrap();
        assert_eq!(lagos.boundary.0.len(), 1);
        let extent = dataset.extent().unwrap();
        assert_eq!((extent.min().x, extent.min().y), (3.0, 6.0));
        assert_eq!((extent.max().x, extent.max().y), (9.0, 12.0));
    }

    #[test]
    fn missing_year_column_is_fatal() {
        let doc = collection(vec![feature("Lagos", square(0.0, 0.0), &[(2014, json!(1.0))])]);
        let err = read_dataset(doc, "memory", &config()).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
        assert!(err.to_string().contains("2015_mean"));
    }

    #[test]
    fn non_numeric_year_value_is_fatal() {
        let doc = collection(vec![feature(
            "Lagos",
            square(0.0, 0.0),
            &[(2014, json!(1.0)), (2015, json!("heavy"))],
        )]);
        assert!(matches!(
            read_dataset(doc, "memory", &config()),
            Err(DataError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn point_geometry_is_rejected() {
        let point = json!({ "type": "Point", "coordinates": [3.4, 6.5] });
        let doc = collection(vec![feature("Lagos", point, &[(2014, json!(1.0)), (2015, json!(2.0))])]);
        let err = read_dataset(doc, "memory", &config()).unwrap_err();
        assert!(err.to_string().contains("expected Polygon"));
    }

    #[test]
    fn missing_state_is_rejected() {
        let doc = collection(vec![json!({
            "type": "Feature",
            "geometry": square(0.0, 0.0),
            "properties": { "2014_mean": 1.0, "2015_mean": 2.0 }
        })]);
        let err = read_dataset(doc, "memory", &config()).unwrap_err();
        assert!(err.to_string().contains("no State"));
    }

    #[test]
    fn bare_geometry_and_empty_collections_are_rejected() {
        let geometry: GeoJson = square(0.0, 0.0).to_string().parse().unwrap();
        assert!(read_dataset(geometry, "memory", &config()).is_err());
        assert!(read_dataset(collection(vec![]), "memory", &config()).is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", sample()).unwrap();
        let config = Config {
            data_path: file.path().to_path_buf(),
            ..config()
        };
        let (dataset, _) = load(&config).unwrap();
        assert_eq!(dataset.records().len(), 4);
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_path: dir.path().join("absent.geojson"),
            ..config()
        };
        assert!(matches!(load(&config), Err(DataError::DataUnavailable { .. })));
    }

    #[test]
    fn corrupt_file_is_data_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"type\": \"FeatureCollection\", \"features\": [").unwrap();
        let config = Config {
            data_path: file.path().to_path_buf(),
            ..config()
        };
        assert!(matches!(load(&config), Err(DataError::DataUnavailable { .. })));
    }
}
