use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::config::ChartConfig;
use crate::data::loader;
use crate::error::LoadError;
use crate::state::series::TemperatureData;
use crate::ui::chart_panel::Chart;

type LoadResult = Result<TemperatureData, LoadError>;

/// Table load running on a background thread.
struct PendingLoad {
    result: Arc<Mutex<Option<LoadResult>>>,
}

impl PendingLoad {
    /// The load result, once the loader thread has produced it.
    fn take(&self) -> Option<LoadResult> {
        match self.result.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

enum ChartState {
    Loading(PendingLoad),
    Ready(Box<Chart>),
    /// Loading failed; the chart is never built.
    Failed(String),
}

impl ChartState {
    /// State after the loader finished: a chart over the loaded table, or
    /// the error message.
    fn from_load_result(result: LoadResult, config: &Arc<ChartConfig>) -> Self {
        match result {
            Ok(data) => {
                tracing::info!("Loaded {} series from {:?}", data.series.len(), config.data_path);
                ChartState::Ready(Box::new(Chart::new(Arc::clone(config), data)))
            }
            Err(e) => {
                tracing::error!("Failed to load temperature data: {e}");
                ChartState::Failed(e.to_string())
            }
        }
    }
}

/// The temperature chart application.
pub struct TemperatureChartApp {
    config: Arc<ChartConfig>,
    state: ChartState,
}

impl TemperatureChartApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ChartConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self::start(config)
    }

    /// Start loading the configured table in the background.
    pub fn start(config: ChartConfig) -> Self {
        let config = Arc::new(config);
        let pending = start_load(Arc::clone(&config));
        Self {
            config,
            state: ChartState::Loading(pending),
        }
    }

    /// The chart, once the table loaded successfully.
    pub fn chart(&self) -> Option<&Chart> {
        match &self.state {
            ChartState::Ready(chart) => Some(&**chart),
            _ => None,
        }
    }

    /// Move a finished background load into the chart state.
    fn poll_load(&mut self) {
        let ChartState::Loading(pending) = &self.state else {
            return;
        };
        let Some(result) = pending.take() else {
            return;
        };

        self.state = ChartState::from_load_result(result, &self.config);
    }
}

/// Parse the configured table asynchronously so the window opens at once.
fn start_load(config: Arc<ChartConfig>) -> PendingLoad {
    let result: Arc<Mutex<Option<LoadResult>>> = Arc::new(Mutex::new(None));
    let result_clone = Arc::clone(&result);

    tracing::info!("Loading temperature data from {:?}", config.data_path);
    std::thread::spawn(move || {
        let loaded = loader::load_csv(&config.data_path, &config.regions);
        match result_clone.lock() {
            Ok(mut slot) => *slot = Some(loaded),
            Err(poisoned) => *poisoned.into_inner() = Some(loaded),
        }
    });

    PendingLoad { result }
}

impl eframe::App for TemperatureChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_load();

        egui::CentralPanel::default().show(ctx, |ui| match &mut self.state {
            ChartState::Loading(_) => {
                ui.centered_and_justified(|ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(format!("Loading {}...", self.config.data_path.display()));
                    });
                });
                ctx.request_repaint();
            }
            ChartState::Failed(message) => {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(
                        ui.visuals().error_fg_color,
                        format!("Could not load temperature data: {message}"),
                    );
                });
            }
            ChartState::Ready(chart) => chart.show(ui),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Poll until the background load settles.
    fn settle(app: &mut TemperatureChartApp) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while matches!(app.state, ChartState::Loading(_)) && Instant::now() < deadline {
            app.poll_load();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn missing_file_fails_without_building_a_chart() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChartConfig {
            data_path: dir.path().join("no_such_table.csv"),
            ..ChartConfig::default()
        };
        let mut app = TemperatureChartApp::start(config);
        settle(&mut app);

        match &app.state {
            ChartState::Failed(message) => assert!(message.contains("no_such_table.csv"), "{message}"),
            _ => panic!("expected the load to fail"),
        }
        assert!(app.chart().is_none());
    }

    #[test]
    fn loaded_table_builds_the_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ZonAnn.Ts.csv");
        std::fs::write(&path, "Year,Glob,NHem,SHem\n1880,-20,-30,-10\n1881,-15,-25,-5\n").unwrap();
        let config = ChartConfig {
            data_path: path,
            ..ChartConfig::default()
        };
        let mut app = TemperatureChartApp::start(config);
        settle(&mut app);

        let chart = app.chart().expect("chart is built");
        assert_eq!(chart.data().series.len(), 3);
    }
}
