use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;
use std::time::Duration;

use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke};

use crate::config::ChartConfig;
use crate::data::datetime;
use crate::processing::kd_tree::NearestTree;
use crate::render::layout::{ChartLayout, LayoutCache};
use crate::render::plot_interaction::{self, PlotViewState};
use crate::state::series::{Series, TemperatureData};
use crate::tooltip::{NearestCandidate, SeriesId, TooltipArbiter};

/// The line chart: loaded series, view bounds, layout and tooltip state.
pub struct Chart {
    config: Arc<ChartConfig>,
    data: TemperatureData,
    view: PlotViewState,
    layout: LayoutCache,
    tooltips: TooltipArbiter,
    /// Pointer position, plot rect and view the last sample was taken
    /// against, while the pointer is over the plot.
    sampled: Option<(Pos2, Rect, PlotViewState)>,
}

impl Chart {
    pub fn new(config: Arc<ChartConfig>, data: TemperatureData) -> Self {
        let mut view = PlotViewState::new();
        view.fit_to_data(&data);
        Self {
            layout: LayoutCache::new(config.legend_rows()),
            tooltips: TooltipArbiter::from_config(&config),
            config,
            data,
            view,
            sampled: None,
        }
    }

    pub fn data(&self) -> &TemperatureData {
        &self.data
    }

    pub fn view(&self) -> &PlotViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut PlotViewState {
        &mut self.view
    }

    pub fn tooltips(&self) -> &TooltipArbiter {
        &self.tooltips
    }

    pub fn tooltips_mut(&mut self) -> &mut TooltipArbiter {
        &mut self.tooltips
    }

    /// Layout for `area`; recomputed only when `area` changed since last time.
    pub fn layout_for(&mut self, area: Rect) -> ChartLayout {
        self.layout.update(area)
    }

    pub fn layout_recomputations(&self) -> u64 {
        self.layout.recomputations()
    }

    /// Point of `series` nearest to `pointer`, among the points drawn inside
    /// the horizontal extent of `plot`.
    pub fn nearest_candidate(&self, series: &Series, pointer: Pos2, plot: Rect) -> Option<NearestCandidate> {
        let tree = NearestTree::build(series.present().filter_map(|(i, x, y)| {
            let pos = self.view.data_to_screen(x, y, plot);
            (pos.x >= plot.left() && pos.x <= plot.right()).then_some((i, pos))
        }));
        let (index, _) = tree.nearest(pointer)?;
        let sample = series.samples.get(index)?;
        let temperature = sample.temperature?;
        let position = self.view.data_to_screen(sample.x(), temperature, plot);
        Some(NearestCandidate::new(index, sample.year(), temperature, position, pointer))
    }

    /// A pointer move over the plot area: every series reports its nearest
    /// point for the same pointer sample.
    pub fn pointer_moved(&mut self, pointer: Pos2, plot: Rect, now: f64) {
        let sample = self.tooltips.pointer_moved(pointer);
        let candidates: Vec<(SeriesId, NearestCandidate)> = self
            .data
            .series
            .iter()
            .enumerate()
            .filter_map(|(i, s)| self.nearest_candidate(s, pointer, plot).map(|c| (SeriesId(i), c)))
            .collect();
        for (id, candidate) in candidates {
            self.tooltips.report_candidate(id, sample, candidate, now);
        }
        self.sampled = Some((pointer, plot, self.view.clone()));
    }

    /// The pointer left the plot area: every series hides its tooltip.
    pub fn pointer_exited(&mut self) {
        for i in 0..self.tooltips.series_count() {
            self.tooltips.on_pointer_exit(SeriesId(i));
        }
        self.sampled = None;
    }

    /// Hover state of one frame. A new sample is taken when the pointer
    /// moved, or when the plot rect or the view changed under a still
    /// pointer, so the marker follows the redrawn points.
    pub fn pointer_hover(&mut self, pointer: Option<Pos2>, plot: Rect, now: f64) {
        match pointer.filter(|p| plot.contains(*p)) {
            Some(pointer) => {
                let unchanged = self
                    .sampled
                    .as_ref()
                    .is_some_and(|(p, r, v)| *p == pointer && *r == plot && *v == self.view);
                if !unchanged {
                    self.pointer_moved(pointer, plot, now);
                }
            }
            None => {
                if self.sampled.is_some() {
                    self.pointer_exited();
                }
            }
        }
    }

    /// Render the chart into all remaining space of `ui`.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let area = ui.available_rect_before_wrap();
        let layout = self.layout_for(area);
        ui.allocate_rect(area, egui::Sense::hover());

        // --- Pan/zoom on the time axis ---
        let response = ui.interact(layout.plot, ui.id().with("temperature_plot"), egui::Sense::click_and_drag());
        self.view.handle_input(&response, layout.plot);
        if self.view.auto_fit {
            self.view.fit_to_data(&self.data);
        }

        // --- Pointer samples feed the tooltip arbiter ---
        let now = ui.input(|i| i.time);
        self.pointer_hover(response.hover_pos(), layout.plot, now);
        self.tooltips.poll(now);
        if let Some(due) = self.tooltips.next_due() {
            ui.ctx().request_repaint_after(Duration::from_secs_f64((due - now).max(0.0)));
        }

        let painter = ui.painter_at(area);
        painter.rect_filled(layout.plot, 0.0, ui.visuals().extreme_bg_color);

        draw_series(&painter.with_clip_rect(layout.plot), &self.data, &self.view, layout.plot, self.config.stroke_width);
        draw_axes(&painter, &self.view, &layout);
        draw_labels(&painter, &self.config, &layout);
        draw_legend(&painter, &self.data, layout.legend, self.config.legend_entries_per_row);
        draw_tooltip(&painter, &self.tooltips, &self.data, &layout, self.config.marker_radius);
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

fn draw_series(painter: &egui::Painter, data: &TemperatureData, view: &PlotViewState, plot: Rect, stroke_width: f32) {
    for series in &data.series {
        let stroke = Stroke::new(stroke_width, series.color32());
        for run in series.runs() {
            if run.len() < 2 {
                continue;
            }
            let points: Vec<Pos2> = run.iter().map(|&(x, y)| view.data_to_screen(x, y, plot)).collect();
            painter.add(egui::Shape::line(points, stroke));
        }
    }
}

// ---------------------------------------------------------------------------
// Axes, title and axis labels
// ---------------------------------------------------------------------------

fn draw_axes(painter: &egui::Painter, view: &PlotViewState, layout: &ChartLayout) {
    let text_color = painter.ctx().style().visuals.text_color();
    let axis_stroke = Stroke::new(1.0, text_color.gamma_multiply(0.6));
    let font = FontId::proportional(11.0);
    let plot = layout.plot;

    // Time axis
    painter.line_segment([plot.left_bottom(), plot.right_bottom()], axis_stroke);
    let (x_ticks, x_step) = plot_interaction::compute_ticks(view.x_min, view.x_max);
    for x in x_ticks {
        let sx = view.data_to_screen(x, view.y_min, plot).x;
        if sx < plot.left() || sx > plot.right() {
            continue;
        }
        let top = Pos2::new(sx, layout.x_axis.top());
        painter.line_segment([top, Pos2::new(sx, top.y + 5.0)], axis_stroke);
        painter.text(
            Pos2::new(sx, top.y + 7.0),
            Align2::CENTER_TOP,
            datetime::format_time_tick(x, x_step),
            font.clone(),
            text_color,
        );
    }

    // Value axis
    painter.line_segment([plot.left_top(), plot.left_bottom()], axis_stroke);
    let (y_ticks, _) = plot_interaction::compute_ticks(view.y_min, view.y_max);
    for y in y_ticks {
        let sy = view.data_to_screen(view.x_min, y, plot).y;
        if sy < plot.top() || sy > plot.bottom() {
            continue;
        }
        let right = Pos2::new(layout.y_axis.right(), sy);
        painter.line_segment([Pos2::new(right.x - 5.0, sy), right], axis_stroke);
        painter.text(
            Pos2::new(right.x - 7.0, sy),
            Align2::RIGHT_CENTER,
            plot_interaction::format_tick_value(y),
            font.clone(),
            text_color,
        );
    }
}

fn draw_labels(painter: &egui::Painter, config: &ChartConfig, layout: &ChartLayout) {
    let text_color = painter.ctx().style().visuals.text_color();

    painter.text(
        layout.title.center_top() + egui::vec2(0.0, 4.0),
        Align2::CENTER_TOP,
        &config.title,
        FontId::proportional(18.0),
        text_color,
    );

    painter.text(
        layout.x_label.center(),
        Align2::CENTER_CENTER,
        &config.x_label,
        FontId::proportional(12.0),
        text_color,
    );

    // Rotated -90 degrees, reading bottom to top, centred in its column.
    let galley = painter.layout_no_wrap(config.y_label.clone(), FontId::proportional(12.0), text_color);
    let size = galley.size();
    let center = layout.y_label.center();
    let pos = Pos2::new(center.x - size.y / 2.0, center.y + size.x / 2.0);
    painter.add(egui::epaint::TextShape::new(pos, galley, text_color).with_angle(-FRAC_PI_2));
}

// ---------------------------------------------------------------------------
// Legend
// ---------------------------------------------------------------------------

fn draw_legend(painter: &egui::Painter, data: &TemperatureData, rect: Rect, per_row: usize) {
    let text_color = painter.ctx().style().visuals.text_color();
    let font = FontId::proportional(12.0);
    let per_row = per_row.max(1);
    let row_height = if data.series.is_empty() {
        0.0
    } else {
        rect.height() / data.series.len().div_ceil(per_row) as f32
    };

    for (row_index, row) in data.series.chunks(per_row).enumerate() {
        let galleys: Vec<_> = row
            .iter()
            .map(|s| painter.layout_no_wrap(s.name.clone(), font.clone(), text_color))
            .collect();
        // symbol + gap + text + spacing between entries
        let widths: Vec<f32> = galleys.iter().map(|g| 14.0 + g.size().x + 16.0).collect();
        let total: f32 = widths.iter().sum();

        let cy = rect.top() + row_height * (row_index as f32 + 0.5);
        let mut x = rect.center().x - total / 2.0;
        for ((series, galley), width) in row.iter().zip(galleys).zip(widths) {
            painter.circle_filled(Pos2::new(x + 5.0, cy), 5.0, series.color32());
            let text_pos = Pos2::new(x + 14.0, cy - galley.size().y / 2.0);
            painter.galley(text_pos, galley, text_color);
            x += width;
        }
    }
}

// ---------------------------------------------------------------------------
// Tooltip
// ---------------------------------------------------------------------------

fn draw_tooltip(painter: &egui::Painter, tooltips: &TooltipArbiter, data: &TemperatureData, layout: &ChartLayout, marker_radius: f32) {
    let Some((id, anchor)) = tooltips.visible() else {
        return;
    };
    let color = data.series.get(id.0).map(Series::color32).unwrap_or(Color32::WHITE);
    let marker = anchor.position;
    painter.circle_filled(marker, marker_radius, color);
    painter.circle_stroke(marker, marker_radius, Stroke::new(1.0, Color32::WHITE));

    let font = FontId::proportional(12.0);
    let galley = painter.layout_no_wrap(anchor.text.clone(), font, Color32::WHITE);
    let size = galley.size() + egui::vec2(12.0, 8.0);

    let bg_rect = tooltip_rect(marker, marker_radius, size, layout.plot);

    painter.rect_filled(bg_rect, 4.0, Color32::from_black_alpha(230));
    painter.galley(bg_rect.min + egui::vec2(6.0, 4.0), galley, Color32::WHITE);
}

/// Tooltip box of `size` above-right of the marker, flipped below or to the
/// left to stay inside `plot`.
fn tooltip_rect(marker: Pos2, marker_radius: f32, size: egui::Vec2, plot: Rect) -> Rect {
    let above = marker.y - marker_radius - 6.0 - size.y;
    let top = if above >= plot.top() {
        above
    } else {
        marker.y + marker_radius + 6.0
    };
    let left = (marker.x + marker_radius).min(plot.right() - size.x).max(plot.left());
    Rect::from_min_size(Pos2::new(left, top), size)
}
