use crate::state::series::TemperatureData;

/// Zooming out stops at this multiple of the fitted time span.
const MAX_ZOOM_OUT: f64 = 10.0;

/// View bounds of the chart in data coordinates (x in fractional years,
/// y in anomaly units) and the pan/zoom interaction on them.
///
/// Only the time axis pans and zooms; the value axis stays fitted to the
/// whole table.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotViewState {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Refit the view to the data on the next frame.
    pub auto_fit: bool,
    /// Widest time span zooming out may reach.
    pub max_x_span: f64,
}

impl Default for PlotViewState {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.0,
            y_max: 1.0,
            auto_fit: true,
            max_x_span: f64::INFINITY,
        }
    }
}

impl PlotViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit both axes to the data, with 5% padding on each side.
    pub fn fit_to_data(&mut self, data: &TemperatureData) {
        if let Some((x_min, x_max)) = data.x_range() {
            let (lo, hi) = padded(x_min, x_max);
            self.x_min = lo;
            self.x_max = hi;
            self.max_x_span = (hi - lo) * MAX_ZOOM_OUT;
        }
        if let Some((y_min, y_max)) = data.y_range() {
            let (lo, hi) = padded(y_min, y_max);
            self.y_min = lo;
            self.y_max = hi;
        }
        self.auto_fit = false;
    }

    /// Pan the time axis by a horizontal pixel delta.
    pub fn pan_x(&mut self, delta_px: f32, plot_width: f32) {
        if plot_width <= 0.0 {
            return;
        }
        let dx = -(delta_px as f64) * (self.x_max - self.x_min) / plot_width as f64;
        self.x_min += dx;
        self.x_max += dx;
    }

    /// Zoom the time axis around `center_x` (data units). Factors below one
    /// zoom in. The span never grows past `max_x_span`.
    pub fn zoom_x(&mut self, factor: f64, center_x: f64) {
        let span = self.x_max - self.x_min;
        let factor = factor.clamp(0.5, 2.0).min(self.max_x_span / span);
        let x_min = center_x + (self.x_min - center_x) * factor;
        let x_max = center_x + (self.x_max - center_x) * factor;
        if x_max - x_min > 1e-6 {
            self.x_min = x_min;
            self.x_max = x_max;
        }
    }

    /// Handle mouse input on the plot area for pan/zoom.
    pub fn handle_input(&mut self, response: &egui::Response, rect: egui::Rect) {
        // Pan: drag with primary mouse button
        if response.dragged_by(egui::PointerButton::Primary) {
            self.pan_x(response.drag_delta().x, rect.width());
        }

        // Zoom: scroll wheel, centered on mouse position
        let scroll_delta = response.ctx.input(|i| {
            if response.hovered() {
                i.smooth_scroll_delta.y
            } else {
                0.0
            }
        });

        if scroll_delta.abs() > 0.0 {
            if let Some(mouse_pos) = response.hover_pos() {
                let (cx, _) = self.screen_to_data(mouse_pos, rect);
                self.zoom_x(1.0 - (scroll_delta as f64) * 0.001, cx);
            }
        }

        // Double-click to refit
        if response.double_clicked() {
            self.auto_fit = true;
        }
    }

    /// Convert screen position to data coordinates.
    pub fn screen_to_data(&self, pos: egui::Pos2, rect: egui::Rect) -> (f64, f64) {
        let t_x = (pos.x - rect.left()) as f64 / rect.width() as f64;
        let t_y = 1.0 - (pos.y - rect.top()) as f64 / rect.height() as f64;
        let data_x = self.x_min + t_x * (self.x_max - self.x_min);
        let data_y = self.y_min + t_y * (self.y_max - self.y_min);
        (data_x, data_y)
    }

    /// Convert data coordinates to screen position.
    pub fn data_to_screen(&self, x: f64, y: f64, rect: egui::Rect) -> egui::Pos2 {
        let t_x = (x - self.x_min) / (self.x_max - self.x_min);
        let t_y = 1.0 - (y - self.y_min) / (self.y_max - self.y_min);
        egui::Pos2::new(
            rect.left() + (t_x as f32) * rect.width(),
            rect.top() + (t_y as f32) * rect.height(),
        )
    }
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    let pad = (max - min) * 0.05;
    let pad = if pad.abs() < 1e-15 { 0.5 } else { pad };
    (min - pad, max + pad)
}

/// Tick positions for an axis range, on a 1/2/5 "nice" step.
/// Returns the ticks and the step between them.
pub fn compute_ticks(min: f64, max: f64) -> (Vec<f64>, f64) {
    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return (Vec::new(), 0.0);
    }

    let raw_step = range / 8.0;
    let order = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / order;

    let step = if normalized <= 1.0 {
        order
    } else if normalized <= 2.0 {
        2.0 * order
    } else if normalized <= 5.0 {
        5.0 * order
    } else {
        10.0 * order
    };

    let start = (min / step).ceil() as i64;
    let end = (max / step).floor() as i64;
    let ticks = (start..=end).map(|i| i as f64 * step).collect();
    (ticks, step)
}

/// Format a numeric value for axis tick labels.
pub fn format_tick_value(val: f64) -> String {
    if val.abs() >= 1e6 || (val != 0.0 && val.abs() < 1e-3) {
        format!("{val:.2e}")
    } else if val == 0.0 {
        "0".to_string()
    } else {
        let s = format!("{val:.6}");
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        s.to_string()
    }
}
