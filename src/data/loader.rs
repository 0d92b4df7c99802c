use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::config::{RegionSpec, YEAR_COLUMN};
use crate::data::{datetime, parser};
use crate::error::LoadError;
use crate::state::series::{color_for_index, Sample, Series, TemperatureData};

/// Load the temperature table at `path` into one series per region.
pub fn load_csv(path: &Path, regions: &[RegionSpec]) -> Result<TemperatureData, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    read_table(reader, regions)
}

/// Same as [`load_csv`] for an in-memory or streamed table.
pub fn parse_reader<R: Read>(input: R, regions: &[RegionSpec]) -> Result<TemperatureData, LoadError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    read_table(reader, regions)
}

fn read_table<R: Read>(mut reader: csv::Reader<R>, regions: &[RegionSpec]) -> Result<TemperatureData, LoadError> {
    let headers = reader.headers()?.clone();
    for column in std::iter::once(YEAR_COLUMN).chain(regions.iter().map(|r| r.key.as_str())) {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }

    let mut samples: Vec<Vec<Sample>> = vec![Vec::new(); regions.len()];
    for record in reader.records() {
        let record = record?;
        let row: HashMap<String, String> = record.deserialize(Some(&headers))?;
        let year_cell = row.get(YEAR_COLUMN).map(String::as_str).unwrap_or_default();
        let date = parser::parse_year(year_cell)
            .and_then(datetime::year_start)
            .ok_or_else(|| LoadError::InvalidYear {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                value: year_cell.to_string(),
            })?;

        for (region, out) in regions.iter().zip(samples.iter_mut()) {
            let temperature = row
                .get(&region.key)
                .and_then(|cell| parser::parse_temperature(cell));
            out.push(Sample { date, temperature });
        }
    }

    let series = regions
        .iter()
        .zip(samples)
        .enumerate()
        .map(|(i, (region, samples))| {
            Series::new(region.key.clone(), region.name.clone(), samples, color_for_index(i))
        })
        .collect();

    Ok(TemperatureData::new(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;

    const TABLE: &str = "\
Year,Glob,NHem,SHem,24N-90N
1880,-20,-31,-9,-41
1881,NaN,-20,,-31
1882,56,***,-11,-26
";

    #[test]
    fn reads_one_series_per_region() {
        let config = ChartConfig::default();
        let data = parse_reader(TABLE.as_bytes(), &config.regions).unwrap();
        assert_eq!(data.series.len(), 3);

        let glob = &data.series[0];
        assert_eq!(glob.key, "Glob");
        assert_eq!(glob.name, "Global");
        let years: Vec<i32> = glob.samples.iter().map(Sample::year).collect();
        assert_eq!(years, vec![1880, 1881, 1882]);
        let temps: Vec<Option<f64>> = glob.samples.iter().map(|s| s.temperature).collect();
        assert_eq!(temps, vec![Some(-20.0), None, Some(56.0)]);

        assert_eq!(data.series[1].samples[2].temperature, None);
        assert_eq!(data.series[2].samples[1].temperature, None);
    }

    #[test]
    fn missing_region_column_is_an_error() {
        let config = ChartConfig::default();
        let err = parse_reader("Year,Glob,NHem\n1880,1,2\n".as_bytes(), &config.regions).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "SHem"));
    }

    #[test]
    fn bad_year_is_an_error() {
        let config = ChartConfig::default();
        let err = parse_reader("Year,Glob,NHem,SHem\nabc,1,2,3\n".as_bytes(), &config.regions).unwrap_err();
        match err {
            LoadError::InvalidYear { value, .. } => assert_eq!(value, "abc"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_table_is_empty() {
        let config = ChartConfig::default();
        let data = parse_reader("Year,Glob,NHem,SHem\n".as_bytes(), &config.regions).unwrap();
        assert!(data.is_empty());
    }
}
