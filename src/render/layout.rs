use egui::{pos2, Rect};

const TITLE_HEIGHT: f32 = 30.0;
const LEGEND_ROW_HEIGHT: f32 = 20.0;
const Y_LABEL_WIDTH: f32 = 22.0;
const Y_AXIS_WIDTH: f32 = 48.0;
const X_AXIS_HEIGHT: f32 = 24.0;
const X_LABEL_HEIGHT: f32 = 22.0;
const RIGHT_MARGIN: f32 = 16.0;

/// Placement of every chart component inside the available area.
///
/// The chart is a table with three columns (y label, y axis, content) and
/// five rows (title, legend, plot, x axis, x label); the first two columns
/// are only occupied on the plot row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub title: Rect,
    pub legend: Rect,
    pub y_label: Rect,
    pub y_axis: Rect,
    pub plot: Rect,
    pub x_axis: Rect,
    pub x_label: Rect,
}

impl ChartLayout {
    pub fn compute(area: Rect, legend_rows: usize) -> Self {
        let left = area.left();
        let content_left = left + Y_LABEL_WIDTH + Y_AXIS_WIDTH;
        let right = (area.right() - RIGHT_MARGIN).max(content_left + 1.0);

        let title_bottom = area.top() + TITLE_HEIGHT;
        let legend_bottom = title_bottom + LEGEND_ROW_HEIGHT * legend_rows as f32;
        let x_label_top = area.bottom() - X_LABEL_HEIGHT;
        let x_axis_top = x_label_top - X_AXIS_HEIGHT;
        let plot_bottom = x_axis_top.max(legend_bottom + 1.0);

        let row = |top: f32, bottom: f32| Rect::from_min_max(pos2(content_left, top), pos2(right, bottom));

        Self {
            title: row(area.top(), title_bottom),
            legend: row(title_bottom, legend_bottom),
            y_label: Rect::from_min_max(pos2(left, legend_bottom), pos2(left + Y_LABEL_WIDTH, plot_bottom)),
            y_axis: Rect::from_min_max(pos2(left + Y_LABEL_WIDTH, legend_bottom), pos2(content_left, plot_bottom)),
            plot: row(legend_bottom, plot_bottom),
            x_axis: row(plot_bottom, plot_bottom + X_AXIS_HEIGHT),
            x_label: row(plot_bottom + X_AXIS_HEIGHT, plot_bottom + X_AXIS_HEIGHT + X_LABEL_HEIGHT),
        }
    }
}

/// Keeps the last computed layout and recomputes it only when the area it
/// was computed for changes (a viewport resize).
#[derive(Debug, Clone)]
pub struct LayoutCache {
    legend_rows: usize,
    area: Option<Rect>,
    layout: Option<ChartLayout>,
    recomputations: u64,
}

impl LayoutCache {
    pub fn new(legend_rows: usize) -> Self {
        Self {
            legend_rows,
            area: None,
            layout: None,
            recomputations: 0,
        }
    }

    /// Layout for `area`, recomputed iff `area` differs from the last call.
    pub fn update(&mut self, area: Rect) -> ChartLayout {
        match self.layout {
            Some(layout) if self.area == Some(area) => layout,
            _ => {
                let layout = ChartLayout::compute(area, self.legend_rows);
                self.area = Some(area);
                self.layout = Some(layout);
                self.recomputations += 1;
                tracing::debug!(
                    "resize: chart layout recomputed for {:.0}x{:.0}",
                    area.width(),
                    area.height()
                );
                layout
            }
        }
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(w: f32, h: f32) -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), egui::vec2(w, h))
    }

    #[test]
    fn rows_stack_top_to_bottom() {
        let layout = ChartLayout::compute(area(800.0, 600.0), 1);
        assert_eq!(layout.title.top(), 0.0);
        assert_eq!(layout.legend.top(), layout.title.bottom());
        assert_eq!(layout.plot.top(), layout.legend.bottom());
        assert_eq!(layout.x_axis.top(), layout.plot.bottom());
        assert_eq!(layout.x_label.bottom(), 600.0);
        assert_eq!(layout.plot.left(), layout.y_axis.right());
        assert_eq!(layout.y_axis.left(), layout.y_label.right());
        assert_eq!(layout.y_label.top(), layout.plot.top());
        assert!(layout.plot.width() > 0.0 && layout.plot.height() > 0.0);
    }

    #[test]
    fn more_legend_rows_shrink_the_plot() {
        let one = ChartLayout::compute(area(800.0, 600.0), 1);
        let two = ChartLayout::compute(area(800.0, 600.0), 2);
        assert_eq!(one.plot.height() - two.plot.height(), LEGEND_ROW_HEIGHT);
    }

    #[test]
    fn tiny_area_keeps_positive_plot() {
        let layout = ChartLayout::compute(area(10.0, 10.0), 1);
        assert!(layout.plot.width() > 0.0);
        assert!(layout.plot.height() > 0.0);
    }

    #[test]
    fn recomputes_once_per_resize() {
        let mut cache = LayoutCache::new(1);
        let first = cache.update(area(800.0, 600.0));
        cache.update(area(800.0, 600.0));
        assert_eq!(cache.recomputations(), 1);

        let resized = cache.update(area(1024.0, 700.0));
        cache.update(area(1024.0, 700.0));
        assert_eq!(cache.recomputations(), 2);
        assert!(resized.plot.width() > first.plot.width());
    }
}
