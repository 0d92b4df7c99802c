use egui::Pos2;

/// Euclidean distance between two pixel positions.
pub fn euclidean_distance(a: Pos2, b: Pos2) -> f64 {
    let dx = b.x as f64 - a.x as f64;
    let dy = b.y as f64 - a.y as f64;
    (dx * dx + dy * dy).sqrt()
}
