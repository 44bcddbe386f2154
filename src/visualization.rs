use crate::simulation::TelemetryPoint;
use plotters::prelude::*;
use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Render the telemetry series as PNG charts in `output_dir`.
///
/// Returns the paths written: queue depth, cumulative outcomes and gateway
/// throughput.
pub fn plot_telemetry(
    points: &[TelemetryPoint],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    std::fs::create_dir_all(output_dir)?;

    let queue_depth = output_dir.join("queue_depth.png");
    let outcomes = output_dir.join("outcomes.png");
    let throughput = output_dir.join("gateway_throughput.png");

    plot_queue_depth(points, &queue_depth)?;
    plot_outcomes(points, &outcomes)?;
    plot_throughput(points, &throughput)?;

    Ok(vec![queue_depth, outcomes, throughput])
}

/// Time axis covering every point, never empty
fn time_range(points: &[TelemetryPoint]) -> Range<f64> {
    let start = points.first().map(|p| p.time).unwrap_or(0.0);
    let end = points.last().map(|p| p.time).unwrap_or(0.0);
    if end > start {
        start..end
    } else {
        start..start + 1.0
    }
}

/// Expedited and standard queue depth plus busy workers
fn plot_queue_depth(points: &[TelemetryPoint], path: &Path) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_count = points
        .iter()
        .map(|p| p.expedited_depth.max(p.standard_depth).max(p.busy_workers))
        .max()
        .unwrap_or(1)
        .max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Queue Depth Over Time", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range(points), 0..max_count)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Requests")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.time, p.expedited_depth)),
            &RED,
        ))?
        .label("Expedited queue")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.time, p.standard_depth)),
            &BLUE,
        ))?
        .label("Standard queue")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.time, p.busy_workers)),
            &GREEN,
        ))?
        .label("Busy workers")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn plot_outcomes(points: &[TelemetryPoint], path: &Path) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_count = points
        .iter()
        .map(|p| {
            p.cumulative_succeeded
                .max(p.cumulative_rejected)
                .max(p.cumulative_faulted)
        })
        .max()
        .unwrap_or(1)
        .max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Cumulative Outcomes", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range(points), 0u64..max_count)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Requests")
        .draw()?;

    let series: [(&str, RGBColor, fn(&TelemetryPoint) -> u64); 3] = [
        ("Succeeded", GREEN, |p| p.cumulative_succeeded),
        ("Rejected", RED, |p| p.cumulative_rejected),
        ("Server errors", MAGENTA, |p| p.cumulative_faulted),
    ];
    for (label, color, value) in series {
        chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.time, value(p))),
                &color,
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn plot_throughput(points: &[TelemetryPoint], path: &Path) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_rate = points
        .iter()
        .map(|p| p.gateway_calls_per_minute)
        .fold(1.0, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption("Gateway Throughput", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(time_range(points), 0.0..max_rate * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Calls per minute")
        .draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().map(|p| (p.time, p.gateway_calls_per_minute)),
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time: f64) -> TelemetryPoint {
        TelemetryPoint {
            time,
            expedited_depth: 0,
            standard_depth: 0,
            busy_workers: 0,
            cumulative_rejected: 0,
            cumulative_succeeded: 0,
            cumulative_faulted: 0,
            gateway_calls_per_minute: 0.0,
        }
    }

    #[test]
    fn test_time_range() {
        assert_eq!(time_range(&[]), 0.0..1.0);
        assert_eq!(time_range(&[point(5.0)]), 5.0..6.0);
        assert_eq!(time_range(&[point(2.0), point(8.0)]), 2.0..8.0);
    }
}
