//! Periodic snapshots of queue, worker and gateway state.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPoint {
    pub time: f64,
    pub expedited_depth: usize,
    pub standard_depth: usize,
    pub busy_workers: usize,
    pub cumulative_rejected: u64,
    pub cumulative_succeeded: u64,
    pub cumulative_faulted: u64,
    pub gateway_calls_per_minute: f64, // trailing window, scaled to one minute
}

impl TelemetryPoint {
    pub fn queue_depth(&self) -> usize {
        self.expedited_depth + self.standard_depth
    }
}

/// Collects one point per interval boundary crossed by the clock.
///
/// Boundaries are `origin + k * interval`, with the origin at the first
/// boundary at or after the start time. State only changes at events, so the
/// state observed just before the clock jumps past a boundary is the state at
/// that boundary.
#[derive(Debug, Clone)]
pub struct TelemetryRecorder {
    interval: f64,
    origin: f64,
    samples_taken: u64,
    points: Vec<TelemetryPoint>,
}

impl TelemetryRecorder {
    pub fn new(interval: f64, start_time: f64) -> Self {
        let origin = (start_time / interval).ceil() * interval;
        Self {
            interval,
            origin,
            samples_taken: 0,
            points: Vec::new(),
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    fn boundary_at(&self, index: u64) -> f64 {
        self.origin + index as f64 * self.interval
    }

    fn next_boundary(&self) -> f64 {
        self.boundary_at(self.samples_taken)
    }

    /// Next boundary strictly before `until`, if one is still unrecorded
    pub fn due_before(&self, until: f64) -> Option<f64> {
        let boundary = self.next_boundary();
        (boundary < until).then_some(boundary)
    }

    /// Pass over the unrecorded boundaries before `until`, leaving only the
    /// last of them due. For stretches where state cannot change.
    pub fn skip_to_last_before(&mut self, until: f64) {
        if self.due_before(until).is_none() {
            return;
        }
        let estimate = ((until - self.origin) / self.interval).ceil() as u64;
        let mut index = estimate.saturating_sub(1).max(self.samples_taken);
        while self.boundary_at(index + 1) < until {
            index += 1;
        }
        while index > self.samples_taken && self.boundary_at(index) >= until {
            index -= 1;
        }
        self.samples_taken = index;
    }

    /// Store the point for the boundary returned by [`Self::due_before`]
    pub fn record(&mut self, point: TelemetryPoint) {
        self.samples_taken += 1;
        self.points.push(point);
    }

    /// Store the end-of-run point. A point already taken at the same time is replaced.
    pub fn record_final(&mut self, point: TelemetryPoint) {
        if self.points.last().map(|p| p.time) == Some(point.time) {
            self.points.pop();
        }
        self.points.push(point);
    }

    pub fn latest(&self) -> Option<&TelemetryPoint> {
        self.points.last()
    }

    pub fn points(&self) -> &[TelemetryPoint] {
        &self.points
    }
}

/// Write the series as CSV, one row per point
pub fn write_csv<W: Write>(mut out: W, points: &[TelemetryPoint]) -> std::io::Result<()> {
    writeln!(
        out,
        "time,expedited_depth,standard_depth,busy_workers,cumulative_rejected,cumulative_succeeded,cumulative_faulted,gateway_calls_per_minute"
    )?;
    for p in points {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{:.3}",
            p.time,
            p.expedited_depth,
            p.standard_depth,
            p.busy_workers,
            p.cumulative_rejected,
            p.cumulative_succeeded,
            p.cumulative_faulted,
            p.gateway_calls_per_minute,
        )?;
    }
    out.flush()
}

pub fn save_csv<P: AsRef<Path>>(path: P, points: &[TelemetryPoint]) -> std::io::Result<()> {
    write_csv(BufWriter::new(File::create(path)?), points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time: f64) -> TelemetryPoint {
        TelemetryPoint {
            time,
            expedited_depth: 1,
            standard_depth: 2,
            busy_workers: 1,
            cumulative_rejected: 0,
            cumulative_succeeded: 3,
            cumulative_faulted: 1,
            gateway_calls_per_minute: 4.0,
        }
    }

    #[test]
    fn test_boundaries_from_start() {
        let mut recorder = TelemetryRecorder::new(10.0, 3.0);
        assert_eq!(recorder.due_before(10.0), None);
        assert_eq!(recorder.due_before(10.5), Some(10.0));
        recorder.record(point(10.0));
        assert_eq!(recorder.due_before(25.0), Some(20.0));
        recorder.record(point(20.0));
        assert_eq!(recorder.due_before(25.0), None);
        assert_eq!(recorder.points().len(), 2);
    }

    #[test]
    fn test_skip_to_last_before() {
        let mut recorder = TelemetryRecorder::new(60.0, 0.0);
        recorder.record(point(0.0));
        recorder.skip_to_last_before(1e9);
        assert_eq!(recorder.due_before(1e9), Some(999_999_960.0));
        recorder.record(point(999_999_960.0));
        assert_eq!(recorder.due_before(1e9), None);

        // Nothing due: no change
        recorder.skip_to_last_before(1e9);
        assert_eq!(recorder.due_before(1e9 + 61.0), Some(1_000_000_020.0));
    }

    #[test]
    fn test_skip_keeps_single_due_boundary() {
        let mut recorder = TelemetryRecorder::new(10.0, 0.0);
        recorder.skip_to_last_before(5.0);
        assert_eq!(recorder.due_before(5.0), Some(0.0));
        recorder.skip_to_last_before(20.0);
        assert_eq!(recorder.due_before(20.0), Some(10.0));
    }

    #[test]
    fn test_origin_on_boundary() {
        let recorder = TelemetryRecorder::new(5.0, 0.0);
        assert_eq!(recorder.due_before(0.1), Some(0.0));
    }

    #[test]
    fn test_final_point_replaces_same_time() {
        let mut recorder = TelemetryRecorder::new(1.0, 0.0);
        recorder.record(point(0.0));
        recorder.record_final(point(0.0));
        assert_eq!(recorder.points().len(), 1);
        recorder.record_final(point(0.5));
        assert_eq!(recorder.points().len(), 2);
        assert_eq!(recorder.points()[1].queue_depth(), 3);
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[point(60.0)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("time,expedited_depth"));
        assert_eq!(lines[1], "60,1,2,1,0,3,1,4.000");
    }
}
