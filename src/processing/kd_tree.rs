use std::collections::HashMap;

use egui::Pos2;
use kiddo::KdTree;
use kiddo::SquaredEuclidean;

/// Points sharing one coordinate value on an axis that a kiddo leaf bucket
/// can hold; past this the tree cannot split them and refuses to build.
const BUCKET_SIZE: usize = 32;

/// 2D KD-tree over projected pixel positions, used to find the point of a
/// series nearest to the pointer.
pub struct NearestTree {
    index: Index,
    len: usize,
}

enum Index {
    Tree(KdTree<f64, 2>),
    /// Too many coincident coordinates for the tree (e.g. a series squeezed
    /// into a few pixel columns); searched linearly.
    Scan(Vec<(usize, [f64; 2])>),
}

impl NearestTree {
    /// Build from `(item, position)` pairs. Non-finite positions are skipped.
    /// `item` is returned by [`NearestTree::nearest`] and is usually the
    /// sample index inside its series.
    pub fn build<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (usize, Pos2)>,
    {
        let points: Vec<(usize, [f64; 2])> = points
            .into_iter()
            .filter(|(_, pos)| pos.x.is_finite() && pos.y.is_finite())
            .map(|(item, pos)| (item, [pos.x as f64, pos.y as f64]))
            .collect();
        let len = points.len();

        let index = if has_crowded_axis(&points) {
            tracing::debug!("{len} points share pixel coordinates; nearest search falls back to a scan");
            Index::Scan(points)
        } else {
            let mut tree: KdTree<f64, 2> = KdTree::new();
            for (item, pos) in &points {
                tree.add(pos, *item as u64);
            }
            Index::Tree(tree)
        };
        Self { index, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nearest stored point to `query`.
    /// Returns `(item, distance)` with the Euclidean pixel distance, or
    /// `None` when the tree holds no points.
    pub fn nearest(&self, query: Pos2) -> Option<(usize, f64)> {
        if self.is_empty() {
            return None;
        }
        let query = [query.x as f64, query.y as f64];
        match &self.index {
            Index::Tree(tree) => {
                let result = tree.nearest_one::<SquaredEuclidean>(&query);
                Some((result.item as usize, result.distance.sqrt()))
            }
            Index::Scan(points) => points
                .iter()
                .map(|(item, pos)| {
                    let dx = pos[0] - query[0];
                    let dy = pos[1] - query[1];
                    (*item, dx * dx + dy * dy)
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(item, d2)| (item, d2.sqrt())),
        }
    }
}

/// Whether any single coordinate value repeats at least a bucket's worth of
/// times on either axis.
fn has_crowded_axis(points: &[(usize, [f64; 2])]) -> bool {
    (0..2).any(|axis| {
        let mut counts: HashMap<u64, usize> = HashMap::new();
        points.iter().any(|(_, pos)| {
            let count = counts.entry(pos[axis].to_bits()).or_insert(0);
            *count += 1;
            *count >= BUCKET_SIZE
        })
    })
}
