use crate::constants::{CITY_HEADER, COUNTRY_HEADER, LAT_HEADER, LNG_HEADER, LON_HEADER_ALIAS};
use crate::error::{LabelError, Result};
use crate::types::CityRecord;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use std::io::Read;
use std::path::Path;

/// Column positions of the fields we use; the dataset may carry many more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    country: usize,
    city: usize,
    lat: usize,
    lon: usize,
}

impl Columns {
    fn max_index(&self) -> usize {
        self.country.max(self.city).max(self.lat).max(self.lon)
    }
}

/// Reads the city dataset from a CSV file
///
/// # Errors
/// Returns error if the file cannot be read, the header lacks a required
/// column, or no usable row remains.
pub fn read_cities_csv<P: AsRef<Path>>(path: P) -> Result<Vec<CityRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let cities = read_cities_from_reader(file)?;
    if cities.is_empty() {
        return Err(LabelError::EmptyDataset {
            path: path.to_path_buf(),
        });
    }
    debug!("Read {} cities from {}", cities.len(), path.display());
    Ok(cities)
}

/// Read CSV with at least `country,city,lat,lng` columns, in any order.
/// - Rows with blank names, unparsable coordinates or invalid UTF-8 are skipped
///   with a warning
/// - Row order is preserved; it decides selection priority within a country
pub fn read_cities_from_reader<R: Read>(reader: R) -> Result<Vec<CityRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = locate_columns(&mut rdr)?;

    let mut cities = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 2; // CSV rows are 1-indexed, +1 for header
        let rec = match result {
            Ok(rec) => rec,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                warn!("Skipping city row {row}: not valid UTF-8 ({e})");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match parse_record(&rec, row, &columns) {
            Ok(Some(city)) => cities.push(city),
            Ok(None) => {}
            Err(e) => warn!("Skipping city row: {e}"),
        }
    }

    Ok(cities)
}

/// Finds the required columns by header name
fn locate_columns<R: Read>(csv_reader: &mut csv::Reader<R>) -> Result<Columns> {
    let headers = csv_reader
        .headers()
        .map_err(|e| LabelError::CsvHeader(format!("Failed to read headers: {}", e)))?;

    let find = |names: &[&str]| -> Result<usize> {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
            .ok_or_else(|| {
                LabelError::CsvHeader(format!("Missing '{}' column", names.join("' or '")))
            })
    };

    Ok(Columns {
        country: find(&[COUNTRY_HEADER])?,
        city: find(&[CITY_HEADER])?,
        lat: find(&[LAT_HEADER])?,
        lon: find(&[LNG_HEADER, LON_HEADER_ALIAS])?,
    })
}

fn parse_record(rec: &StringRecord, row: usize, columns: &Columns) -> Result<Option<CityRecord>> {
    if rec.iter().all(|f| f.trim().is_empty()) {
        return Ok(None);
    }
    if rec.len() <= columns.max_index() {
        return Err(LabelError::CsvRow {
            row,
            expected: columns.max_index() + 1,
            got: rec.len(),
        });
    }

    let country = get_column_value(rec, columns.country, row)?;
    let city = get_column_value(rec, columns.city, row)?;
    if country.is_empty() || city.is_empty() {
        warn!("Skipping row {row}: blank country or city name");
        return Ok(None);
    }

    let lat = parse_coord_value(get_column_value(rec, columns.lat, row)?, row)?;
    let lon = parse_coord_value(get_column_value(rec, columns.lon, row)?, row)?;

    Ok(Some(CityRecord::new(country, city, lat, lon)))
}

/// Safely extracts a column value from a CSV record
fn get_column_value(record: &StringRecord, column_index: usize, row_number: usize) -> Result<&str> {
    record
        .get(column_index)
        .map(str::trim)
        .ok_or_else(|| LabelError::CsvRow {
            row: row_number,
            expected: column_index + 1,
            got: record.len(),
        })
}

fn parse_coord_value(value: &str, row_number: usize) -> Result<f64> {
    value.parse().map_err(|parse_error| LabelError::CoordParse {
        row: row_number,
        value: value.to_string(),
        source: parse_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_simplemaps_layout() {
        let data = "\
city,city_ascii,lat,lng,country,iso2
Tokyo,Tokyo,35.6897,139.6922,Japan,JP
Osaka,Osaka,34.7525,135.4608,Japan,JP
Lima,Lima,-12.06,-77.0375,Peru,PE
";
        let cities = read_cities_from_reader(data.as_bytes()).unwrap();
        assert_eq!(cities.len(), 3);
        assert_eq!(cities[0], CityRecord::new("Japan", "Tokyo", 35.6897, 139.6922));
        assert_eq!(cities[2].country, "Peru");
        assert_eq!(cities[2].lon, -77.0375);
    }

    #[test]
    fn test_header_case_and_lon_alias() {
        let data = "Country,City,Lat,Lon\nPeru,Lima,-12.06,-77.04\n";
        let cities = read_cities_from_reader(data.as_bytes()).unwrap();
        assert_eq!(cities, vec![CityRecord::new("Peru", "Lima", -12.06, -77.04)]);
    }

    #[test]
    fn test_missing_column_is_error() {
        let data = "country,city,lat\nPeru,Lima,-12.06\n";
        let result = read_cities_from_reader(data.as_bytes());
        assert!(matches!(result, Err(LabelError::CsvHeader(_))));
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let data = "\
country,city,lat,lng
Peru,Lima,-12.06,-77.04
Peru,Cusco,not-a-number,-71.97
,Nowhere,1,1
Peru
Peru,Arequipa,-16.4,-71.53
";
        let cities = read_cities_from_reader(data.as_bytes()).unwrap();
        let names: Vec<&str> = cities.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(names, vec!["Lima", "Arequipa"]);
    }

    #[test]
    fn test_undecodable_row_is_skipped() {
        // Latin-1 encoded city name between two UTF-8 rows
        let mut data = b"country,city,lat,lng\nPeru,Lima,-12.06,-77.04\n".to_vec();
        data.extend_from_slice(b"Colombia,Bogot\xe1,4.71,-74.07\n");
        data.extend_from_slice(b"Chile,Arica,-18.48,-70.33\n");

        let cities = read_cities_from_reader(data.as_slice()).unwrap();
        let names: Vec<&str> = cities.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(names, vec!["Lima", "Arica"]);
    }

    #[test]
    fn test_empty_file_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "country,city,lat,lng").unwrap();

        let result = read_cities_csv(file.path());
        assert!(matches!(result, Err(LabelError::EmptyDataset { .. })));
    }

    #[test]
    fn test_nonexistent_file() {
        let result = read_cities_csv("nonexistent_cities.csv");
        assert!(matches!(result, Err(LabelError::Io(_))));
    }
}
