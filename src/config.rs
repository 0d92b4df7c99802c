use std::path::PathBuf;
use std::time::Duration;

/// Default location of the input table, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "ZonAnn.Ts.csv";

/// Name of the column holding the year of each row.
pub const YEAR_COLUMN: &str = "Year";

/// One plotted region: the CSV column it is read from and its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSpec {
    pub key: String,
    pub name: String,
}

impl RegionSpec {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// Immutable description of the chart, built once at startup and shared
/// with chart construction.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Plotted regions, in legend and drawing order.
    pub regions: Vec<RegionSpec>,
    pub data_path: PathBuf,
    pub title: String,
    pub x_label: String,
    /// Drawn rotated by -90 degrees next to the y axis.
    pub y_label: String,
    pub legend_entries_per_row: usize,
    /// How long a series waits after reporting its nearest point before
    /// deciding whether its tooltip wins.
    pub tooltip_delay: Duration,
    pub stroke_width: f32,
    pub marker_radius: f32,
}

impl ChartConfig {
    pub fn region(&self, index: usize) -> Option<&RegionSpec> {
        self.regions.get(index)
    }

    /// Number of legend rows needed for all regions.
    pub fn legend_rows(&self) -> usize {
        let per_row = self.legend_entries_per_row.max(1);
        self.regions.len().div_ceil(per_row)
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            regions: vec![
                RegionSpec::new("Glob", "Global"),
                RegionSpec::new("NHem", "Northern Hemisphere"),
                RegionSpec::new("SHem", "Southern Hemisphere"),
            ],
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            title: "Annual mean Land-Ocean Temperature Index".to_string(),
            x_label: "Year".to_string(),
            y_label: "Temperature Index (.01 Degrees Celsius)".to_string(),
            legend_entries_per_row: 3,
            tooltip_delay: Duration::from_millis(10),
            stroke_width: 1.0,
            marker_radius: 3.0,
        }
    }
}
