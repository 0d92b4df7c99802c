use eframe::egui;
use eframe::egui_wgpu;

use tempchart::app::TemperatureChartApp;
use tempchart::ChartConfig;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ChartConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size([1000.0, 640.0])
            .with_min_inner_size([480.0, 320.0]),
        wgpu_options: egui_wgpu::WgpuConfiguration {
            present_mode: eframe::wgpu::PresentMode::AutoVsync,
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "tempchart",
        options,
        Box::new(|cc| Ok(Box::new(TemperatureChartApp::new(cc, config)))),
    )
}
