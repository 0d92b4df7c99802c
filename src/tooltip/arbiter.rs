use std::collections::BTreeMap;
use std::time::Duration;

use egui::Pos2;

use crate::config::ChartConfig;
use crate::processing::geometry::euclidean_distance;
use crate::tooltip::anchor::TooltipAnchor;

/// Index of a series in configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesId(pub usize);

/// One pointer position captured from a pointer move over the plot area.
///
/// Two samples are the same move iff their generations match; positions are
/// only carried along for distance computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Pos2,
    generation: u64,
}

impl PointerSample {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The point of one series nearest to a pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestCandidate {
    /// Index of the sample inside its series.
    pub sample_index: usize,
    pub year: i32,
    pub temperature: f64,
    /// Projected pixel position of the sample.
    pub position: Pos2,
    /// Pixel distance between `position` and the pointer.
    pub distance: f64,
}

impl NearestCandidate {
    pub fn new(sample_index: usize, year: i32, temperature: f64, position: Pos2, pointer: Pos2) -> Self {
        Self {
            sample_index,
            year,
            temperature,
            position,
            distance: euclidean_distance(pointer, position),
        }
    }
}

/// Outcome of one deferred check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arbitration {
    /// A newer pointer move happened since the report; nothing changed.
    Stale,
    /// This series' point is the nearest; its tooltip is now the only one shown.
    Won,
    /// Another series is nearer; this series' tooltip is hidden.
    Lost,
}

#[derive(Debug, Clone, Copy)]
struct Recorded {
    generation: u64,
    candidate: NearestCandidate,
}

#[derive(Debug, Clone, Copy)]
struct PendingCheck {
    series: SeriesId,
    sample: PointerSample,
    due: f64,
    seq: u64,
}

/// Debounced, last-write-wins arbiter deciding which series shows its
/// tooltip.
///
/// Series report their nearest candidate independently and in any order.
/// Each report schedules a check a short delay later; by then every series
/// has reported for the same pointer move, and the check compares the full
/// set of distances recorded for that move. Checks belonging to an older
/// pointer move are no-ops.
///
/// When two series tie for the smallest distance, both checks qualify and
/// the one that runs last keeps the tooltip. Checks due at the same time run
/// in report order.
#[derive(Debug)]
pub struct TooltipArbiter {
    delay: f64,
    generation: u64,
    current: Option<PointerSample>,
    distances: BTreeMap<SeriesId, Recorded>,
    pending: Vec<PendingCheck>,
    next_seq: u64,
    anchors: Vec<TooltipAnchor>,
}

impl TooltipArbiter {
    /// One tooltip anchor per region name, in series order.
    pub fn new<I, S>(region_names: I, delay: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            delay: delay.as_secs_f64(),
            generation: 0,
            current: None,
            distances: BTreeMap::new(),
            pending: Vec::new(),
            next_seq: 0,
            anchors: region_names.into_iter().map(TooltipAnchor::new).collect(),
        }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self::new(config.regions.iter().map(|r| r.name.clone()), config.tooltip_delay)
    }

    pub fn series_count(&self) -> usize {
        self.anchors.len()
    }

    /// Start a new pointer move. The returned sample supersedes every
    /// earlier one.
    pub fn pointer_moved(&mut self, position: Pos2) -> PointerSample {
        self.generation += 1;
        let sample = PointerSample {
            position,
            generation: self.generation,
        };
        self.current = Some(sample);
        sample
    }

    pub fn current_pointer(&self) -> Option<PointerSample> {
        self.current
    }

    /// Record `candidate` as the nearest point of `series` for `sample` and
    /// schedule a check `delay` after `now` (seconds). A pending check of the
    /// same series is replaced.
    pub fn report_candidate(&mut self, series: SeriesId, sample: PointerSample, candidate: NearestCandidate, now: f64) {
        if series.0 >= self.anchors.len() {
            tracing::warn!("Ignoring tooltip report for unknown series {}", series.0);
            return;
        }
        debug_assert!(candidate.distance >= 0.0);

        self.distances.insert(
            series,
            Recorded {
                generation: sample.generation,
                candidate,
            },
        );
        if self.current.map_or(true, |c| sample.generation >= c.generation) {
            self.generation = self.generation.max(sample.generation);
            self.current = Some(sample);
        }

        self.pending.retain(|p| p.series != series);
        self.pending.push(PendingCheck {
            series,
            sample,
            due: now + self.delay,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Earliest time at which a pending check becomes due.
    pub fn next_due(&self) -> Option<f64> {
        self.pending.iter().map(|p| p.due).reduce(f64::min)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Run every check due at `now`. Returns how many ran.
    pub fn poll(&mut self, now: f64) -> usize {
        let (mut due, rest): (Vec<PendingCheck>, Vec<PendingCheck>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        for check in &due {
            self.arbitrate(check.series, check.sample);
        }
        due.len()
    }

    /// Decide whether `series` shows its tooltip for `sample`.
    pub fn arbitrate(&mut self, series: SeriesId, sample: PointerSample) -> Arbitration {
        if self.current.map(|c| c.generation) != Some(sample.generation) {
            tracing::trace!(series = series.0, generation = sample.generation, "stale tooltip check");
            return Arbitration::Stale;
        }
        let Some(own) = self
            .distances
            .get(&series)
            .filter(|r| r.generation == sample.generation)
            .map(|r| r.candidate)
        else {
            return Arbitration::Stale;
        };

        let is_closest = self
            .distances
            .iter()
            .filter(|(id, r)| **id != series && r.generation == sample.generation)
            .all(|(_, r)| own.distance <= r.candidate.distance);

        if is_closest {
            for (i, anchor) in self.anchors.iter_mut().enumerate() {
                if i != series.0 {
                    anchor.hide();
                }
            }
            self.anchors[series.0].show_at(own.position, own.year, own.temperature);
            tracing::trace!(series = series.0, distance = own.distance, "tooltip shown");
            Arbitration::Won
        } else {
            self.anchors[series.0].hide();
            Arbitration::Lost
        }
    }

    /// Hide the tooltip of `series` regardless of recorded distances, and drop
    /// its pending check so it cannot come back after the pointer left.
    pub fn on_pointer_exit(&mut self, series: SeriesId) {
        if let Some(anchor) = self.anchors.get_mut(series.0) {
            anchor.hide();
        }
        self.pending.retain(|p| p.series != series);
    }

    /// Distance recorded for `series` against the current pointer sample.
    pub fn recorded_distance(&self, series: SeriesId) -> Option<f64> {
        let generation = self.current?.generation;
        self.distances
            .get(&series)
            .filter(|r| r.generation == generation)
            .map(|r| r.candidate.distance)
    }

    pub fn anchor(&self, series: SeriesId) -> Option<&TooltipAnchor> {
        self.anchors.get(series.0)
    }

    pub fn anchors(&self) -> &[TooltipAnchor] {
        &self.anchors
    }

    /// The tooltip currently shown, if any.
    pub fn visible(&self) -> Option<(SeriesId, &TooltipAnchor)> {
        self.anchors
            .iter()
            .enumerate()
            .find(|(_, a)| a.is_visible())
            .map(|(i, a)| (SeriesId(i), a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    const A: SeriesId = SeriesId(0);
    const B: SeriesId = SeriesId(1);
    const C: SeriesId = SeriesId(2);

    fn arbiter() -> TooltipArbiter {
        TooltipArbiter::new(["Global", "Northern Hemisphere", "Southern Hemisphere"], Duration::from_millis(10))
    }

    fn candidate(distance: f64, year: i32) -> NearestCandidate {
        NearestCandidate {
            sample_index: (year - 1880) as usize,
            year,
            temperature: 10.0,
            position: pos2(distance as f32, 0.0),
            distance,
        }
    }

    fn report_all(arb: &mut TooltipArbiter, sample: PointerSample, distances: [f64; 3], now: f64) {
        for (i, d) in distances.into_iter().enumerate() {
            arb.report_candidate(SeriesId(i), sample, candidate(d, 1900 + i as i32), now);
        }
    }

    fn visible_count(arb: &TooltipArbiter) -> usize {
        arb.anchors().iter().filter(|a| a.is_visible()).count()
    }

    #[test]
    fn nearest_series_wins_whichever_checks_first() {
        for trigger in [A, B, C] {
            let mut arb = arbiter();
            let sample = arb.pointer_moved(pos2(0.0, 0.0));
            report_all(&mut arb, sample, [5.0, 3.2, 9.0], 0.0);

            let expected = if trigger == B { Arbitration::Won } else { Arbitration::Lost };
            assert_eq!(arb.arbitrate(trigger, sample), expected);
            assert_eq!(arb.arbitrate(B, sample), Arbitration::Won);
            assert_eq!(arb.visible().map(|(id, _)| id), Some(B));
        }
    }

    #[test]
    fn winner_shows_text_and_marker_position() {
        let mut arb = arbiter();
        let sample = arb.pointer_moved(pos2(100.0, 50.0));
        let c = NearestCandidate::new(3, 1883, -17.0, pos2(103.0, 54.0), sample.position);
        assert_eq!(c.distance, 5.0);
        arb.report_candidate(A, sample, c, 0.0);

        assert_eq!(arb.arbitrate(A, sample), Arbitration::Won);
        let anchor = arb.anchor(A).unwrap();
        assert_eq!(anchor.position, pos2(103.0, 54.0));
        assert_eq!(anchor.text, "Year: 1883, Temperature: -17, Region: Global");
    }

    #[test]
    fn deferred_checks_run_after_the_delay() {
        let mut arb = arbiter();
        let sample = arb.pointer_moved(pos2(0.0, 0.0));
        report_all(&mut arb, sample, [5.0, 3.2, 9.0], 1.0);

        assert_eq!(arb.poll(1.005), 0);
        assert!(arb.visible().is_none());
        assert!((arb.next_due().unwrap() - 1.010).abs() < 1e-9);

        assert_eq!(arb.poll(1.02), 3);
        assert!(!arb.has_pending());
        assert_eq!(arb.visible().map(|(id, _)| id), Some(B));
    }

    #[test]
    fn newer_pointer_move_makes_pending_checks_stale() {
        let mut arb = arbiter();
        let first = arb.pointer_moved(pos2(0.0, 0.0));
        report_all(&mut arb, first, [1.0, 2.0, 3.0], 0.0);

        let second = arb.pointer_moved(pos2(40.0, 0.0));
        assert_eq!(arb.arbitrate(A, first), Arbitration::Stale);
        assert_eq!(arb.poll(1.0), 3);
        assert_eq!(visible_count(&arb), 0);

        report_all(&mut arb, second, [7.0, 6.0, 0.5], 1.0);
        arb.poll(2.0);
        assert_eq!(arb.visible().map(|(id, _)| id), Some(C));
    }

    #[test]
    fn same_position_again_is_still_a_new_move() {
        let mut arb = arbiter();
        let first = arb.pointer_moved(pos2(5.0, 5.0));
        let second = arb.pointer_moved(pos2(5.0, 5.0));
        assert_ne!(first.generation(), second.generation());
        assert_eq!(arb.current_pointer(), Some(second));

        arb.report_candidate(A, first, candidate(1.0, 1900), 0.0);
        assert_eq!(arb.arbitrate(A, first), Arbitration::Stale);
    }

    #[test]
    fn distances_from_older_moves_are_not_compared() {
        let mut arb = arbiter();
        let first = arb.pointer_moved(pos2(0.0, 0.0));
        arb.report_candidate(B, first, candidate(0.1, 1901), 0.0);

        let second = arb.pointer_moved(pos2(1.0, 0.0));
        arb.report_candidate(A, second, candidate(4.0, 1900), 0.0);
        assert_eq!(arb.recorded_distance(B), None);
        assert_eq!(arb.arbitrate(A, second), Arbitration::Won);
    }

    #[test]
    fn at_most_one_tooltip_after_each_settled_move() {
        let mut arb = arbiter();
        let moves = [[5.0, 3.2, 9.0], [1.0, 8.0, 2.0], [4.0, 4.0, 4.0], [9.0, 9.0, 0.0]];
        for (step, distances) in moves.into_iter().enumerate() {
            let now = step as f64;
            let sample = arb.pointer_moved(pos2(now as f32, 0.0));
            report_all(&mut arb, sample, distances, now);
            arb.poll(now + 0.5);
            assert_eq!(visible_count(&arb), 1, "move {step}");
        }
    }

    #[test]
    fn ties_go_to_the_last_check_that_runs() {
        let mut arb = arbiter();
        let sample = arb.pointer_moved(pos2(0.0, 0.0));
        report_all(&mut arb, sample, [2.0, 2.0, 7.0], 0.0);
        arb.poll(1.0);
        assert_eq!(arb.visible().map(|(id, _)| id), Some(B));

        let sample = arb.pointer_moved(pos2(0.0, 0.0));
        arb.report_candidate(B, sample, candidate(2.0, 1901), 0.0);
        arb.report_candidate(A, sample, candidate(2.0, 1900), 0.0);
        arb.poll(1.0);
        assert_eq!(arb.visible().map(|(id, _)| id), Some(A));
    }

    #[test]
    fn loser_hides_only_its_own_tooltip() {
        let mut arb = arbiter();
        let sample = arb.pointer_moved(pos2(0.0, 0.0));
        report_all(&mut arb, sample, [1.0, 2.0, 3.0], 0.0);
        assert_eq!(arb.arbitrate(A, sample), Arbitration::Won);
        assert_eq!(arb.arbitrate(C, sample), Arbitration::Lost);
        assert!(arb.anchor(A).unwrap().is_visible());
    }

    #[test]
    fn pointer_exit_hides_regardless_of_state() {
        let mut arb = arbiter();
        let sample = arb.pointer_moved(pos2(0.0, 0.0));
        report_all(&mut arb, sample, [1.0, 2.0, 3.0], 0.0);
        arb.poll(1.0);
        assert!(arb.anchor(A).unwrap().is_visible());

        arb.on_pointer_exit(A);
        assert!(!arb.anchor(A).unwrap().is_visible());
        assert_eq!(arb.recorded_distance(A), Some(1.0));

        // Exit before the deferred check fires: the check is dropped.
        let sample = arb.pointer_moved(pos2(3.0, 0.0));
        report_all(&mut arb, sample, [0.5, 2.0, 3.0], 1.0);
        for id in [A, B, C] {
            arb.on_pointer_exit(id);
        }
        assert_eq!(arb.poll(2.0), 0);
        assert_eq!(visible_count(&arb), 0);
    }

    #[test]
    fn unknown_series_is_ignored() {
        let mut arb = arbiter();
        let sample = arb.pointer_moved(pos2(0.0, 0.0));
        arb.report_candidate(SeriesId(9), sample, candidate(0.0, 1900), 0.0);
        assert!(!arb.has_pending());
        arb.on_pointer_exit(SeriesId(9));
        assert_eq!(arb.series_count(), 3);
    }
}
