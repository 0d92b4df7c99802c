use egui::Pos2;

/// The tooltip owned by one series: a marker position and the text shown
/// next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipAnchor {
    /// Region display name, used in the tooltip text.
    pub region_name: String,
    pub position: Pos2,
    pub text: String,
    visible: bool,
}

impl TooltipAnchor {
    pub fn new(region_name: impl Into<String>) -> Self {
        Self {
            region_name: region_name.into(),
            position: Pos2::ZERO,
            text: String::new(),
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Move the marker to `position` and show `Year / Temperature / Region`.
    pub fn show_at(&mut self, position: Pos2, year: i32, temperature: f64) {
        self.position = position;
        self.text = format!(
            "Year: {year}, Temperature: {temperature}, Region: {}",
            self.region_name
        );
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}
