//! tempchart
//!
//! Desktop line chart of annual global and hemispheric temperature anomalies.
//! The data comes from a GISTEMP-style `ZonAnn.Ts.csv` table; the chart
//! supports panning and zooming along the time axis and shows a tooltip for
//! the data point nearest to the pointer, across all plotted regions.

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod render;
pub mod state;
pub mod tooltip;
pub mod ui;

pub use config::{ChartConfig, RegionSpec};
pub use error::LoadError;
pub use state::series::{Sample, Series, TemperatureData};
pub use tooltip::arbiter::{Arbitration, TooltipArbiter};
