use chrono::{Datelike, NaiveDate};

use crate::data::datetime;

/// Categorical palette; region `i` is drawn with `COLOR_PALETTE[i]`.
pub const COLOR_PALETTE: [[u8; 4]; 10] = [
    [82, 121, 199, 255],  // Blue
    [253, 55, 62, 255],   // Red
    [99, 194, 97, 255],   // Green
    [250, 212, 25, 255],  // Yellow
    [44, 43, 111, 255],   // Navy
    [255, 121, 57, 255],  // Orange
    [219, 46, 101, 255],  // Raspberry
    [153, 206, 80, 255],  // Lime
    [150, 37, 101, 255],  // Plum
    [6, 204, 204, 255],   // Cyan
];

pub fn color_for_index(index: usize) -> [u8; 4] {
    COLOR_PALETTE[index % COLOR_PALETTE.len()]
}

/// One yearly observation. `temperature` is `None` when the source cell
/// held no finite number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub date: NaiveDate,
    pub temperature: Option<f64>,
}

impl Sample {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Position on the time axis, in fractional years.
    pub fn x(&self) -> f64 {
        datetime::date_to_year_fraction(self.date)
    }
}

/// One plotted line: the yearly anomalies of a single region.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Region code, also the CSV column name.
    pub key: String,
    pub name: String,
    pub samples: Vec<Sample>,
    pub color: [u8; 4],
}

impl Series {
    pub fn new(key: String, name: String, samples: Vec<Sample>, color: [u8; 4]) -> Self {
        Self {
            key,
            name,
            samples,
            color,
        }
    }

    pub fn color32(&self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.color[0], self.color[1], self.color[2], self.color[3])
    }

    /// Samples that carry a value, with their original index.
    pub fn present(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.temperature.map(|t| (i, s.x(), t)))
    }

    /// Consecutive runs of present samples as `(x, y)` pairs. Absent samples
    /// split the line into separate runs so gaps are drawn as gaps.
    pub fn runs(&self) -> Vec<Vec<(f64, f64)>> {
        let mut runs = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();
        for sample in &self.samples {
            match sample.temperature {
                Some(t) => current.push((sample.x(), t)),
                None => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

/// All series read from one table, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureData {
    pub series: Vec<Series>,
}

impl TemperatureData {
    pub fn new(series: Vec<Series>) -> Self {
        Self { series }
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.samples.is_empty())
    }

    /// Time-axis extent over every sample, present or not.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        extent(self.series.iter().flat_map(|s| s.samples.iter().map(Sample::x)))
    }

    /// Value extent over present samples.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        extent(self.series.iter().flat_map(|s| s.samples.iter().filter_map(|x| x.temperature)))
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}
