//! Summary figures: scatter plots of the crosslink columns and the cumulative
//! CA-distance curve, rendered to PNG with plotters.

use plotters::prelude::*;
use polars::prelude::*;
use tracing::info;

use crate::helper_functions::f64_values;
use crate::models::{polars_err, CA_DISTANCE, SEQUENCE_DISTANCE, SPECTRAL_COUNT};

const BLUE_POINTS: RGBColor = RGBColor(31, 119, 180);
const RED_POINTS: RGBColor = RGBColor(214, 39, 40);
const CURVE_COLOURS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(148, 103, 189),
];

pub struct ScatterSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
}

pub struct ScatterPlot<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub series: Vec<ScatterSeries>,
    pub vertical_line: Option<f64>,
    pub horizontal_line: Option<f64>,
    pub log_y: bool,
}

/// `(x, y)` per row, skipping rows where either value is missing.
pub fn xy_points(df: &DataFrame, x_col: &str, y_col: &str) -> PolarsResult<Vec<(f64, f64)>> {
    let xs = f64_values(df, x_col)?;
    let ys = f64_values(df, y_col)?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect())
}

/// Sorted values paired with the percentage of values at or below them.
pub fn cumulative_percentage(values: &[f64]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, 100.0 * (i + 1) as f64 / n))
        .collect()
}

fn upper_bound<'a>(values: impl Iterator<Item = &'a f64>, floor: f64) -> f64 {
    values.copied().fold(floor, f64::max) * 1.05
}

fn log_bounds<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let positive: Vec<f64> = values.copied().filter(|v| *v > 0.0).collect();
    if positive.is_empty() {
        return (1.0, 10.0);
    }
    let lo = positive.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = positive.iter().copied().fold(0.0, f64::max);
    (lo * 0.8, hi * 1.25)
}

// Body shared by the linear and log-scaled charts, whose coordinate types differ.
macro_rules! draw_scatter_body {
    ($chart:ident, $plot:ident, $x_bounds:expr, $y_bounds:expr) => {{
        let (x_lo, x_hi) = $x_bounds;
        let (y_lo, y_hi) = $y_bounds;

        $chart
            .configure_mesh()
            .x_desc($plot.x_desc)
            .y_desc($plot.y_desc)
            .axis_desc_style(("sans-serif", 20))
            .label_style(("sans-serif", 16))
            .draw()
            .map_err(|e| polars_err(Box::new(e)))?;

        for series in &$plot.series {
            let color = series.color;
            $chart
                .draw_series(
                    series
                        .points
                        .iter()
                        .map(move |&point| Circle::new(point, 3, color.mix(0.7).filled())),
                )
                .map_err(|e| polars_err(Box::new(e)))?
                .label(series.label.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }

        if let Some(x) = $plot.vertical_line {
            $chart
                .draw_series(LineSeries::new(vec![(x, y_lo), (x, y_hi)], RED.stroke_width(2)))
                .map_err(|e| polars_err(Box::new(e)))?;
        }
        if let Some(y) = $plot.horizontal_line {
            $chart
                .draw_series(LineSeries::new(vec![(x_lo, y), (x_hi, y)], RED.stroke_width(2)))
                .map_err(|e| polars_err(Box::new(e)))?;
        }

        if $plot.series.len() > 1 {
            $chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(("sans-serif", 18))
                .position(SeriesLabelPosition::UpperRight)
                .draw()
                .map_err(|e| polars_err(Box::new(e)))?;
        }
    }};
}

pub fn draw_scatter_plot(output_path: &str, plot: &ScatterPlot) -> PolarsResult<()> {
    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| polars_err(Box::new(e)))?;

    let x_hi = upper_bound(plot.series.iter().flat_map(|s| s.points.iter().map(|(x, _)| x)), 1.0);
    let ys: Vec<f64> = plot
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(_, y)| y))
        .collect();

    if plot.log_y {
        let (y_lo, y_hi) = log_bounds(ys.iter());
        let mut chart = ChartBuilder::on(&root)
            .caption(plot.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..x_hi, (y_lo..y_hi).log_scale())
            .map_err(|e| polars_err(Box::new(e)))?;
        draw_scatter_body!(chart, plot, (0.0, x_hi), (y_lo, y_hi));
    } else {
        let y_hi = upper_bound(ys.iter(), 1.0);
        let mut chart = ChartBuilder::on(&root)
            .caption(plot.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..x_hi, 0.0..y_hi)
            .map_err(|e| polars_err(Box::new(e)))?;
        draw_scatter_body!(chart, plot, (0.0, x_hi), (0.0, y_hi));
    }

    root.present().map_err(|e| polars_err(Box::new(e)))?;
    info!("Saved plot to {}", output_path);
    Ok(())
}

fn positive_y(points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    points.into_iter().filter(|&(_, y)| y > 0.0).collect()
}

pub fn plot_ca_distance_vs_spectral_count(df: &DataFrame, output_path: &str) -> PolarsResult<()> {
    let plot = ScatterPlot {
        title: "C-alpha Distance vs Spectral Count",
        x_desc: "C-alpha Distance (Å)",
        y_desc: "Spectral Count",
        series: vec![ScatterSeries {
            label: "All Data".to_string(),
            points: positive_y(xy_points(df, CA_DISTANCE, SPECTRAL_COUNT)?),
            color: BLUE_POINTS,
        }],
        vertical_line: Some(20.0),
        horizontal_line: Some(20.0),
        log_y: true,
    };
    draw_scatter_plot(output_path, &plot)
}

/// All crosslinks with a high-confidence subset overlaid in red.
pub fn plot_sequence_distance_vs_ca_distance(
    df: &DataFrame,
    subset: &DataFrame,
    subset_label: &str,
    ca_reference: f64,
    output_path: &str,
) -> PolarsResult<()> {
    let plot = ScatterPlot {
        title: "Sequence Distance vs C-alpha Distance",
        x_desc: "Sequence Distance",
        y_desc: "C-alpha Distance (Å)",
        series: vec![
            ScatterSeries {
                label: "All Data".to_string(),
                points: xy_points(df, SEQUENCE_DISTANCE, CA_DISTANCE)?,
                color: BLUE_POINTS,
            },
            ScatterSeries {
                label: subset_label.to_string(),
                points: xy_points(subset, SEQUENCE_DISTANCE, CA_DISTANCE)?,
                color: RED_POINTS,
            },
        ],
        vertical_line: None,
        horizontal_line: Some(ca_reference),
        log_y: false,
    };
    draw_scatter_plot(output_path, &plot)
}

pub fn plot_sequence_distance_vs_spectral_count(
    df: &DataFrame,
    output_path: &str,
) -> PolarsResult<()> {
    let plot = ScatterPlot {
        title: "Sequence Distance vs Spectral Count",
        x_desc: "Sequence Distance",
        y_desc: "Spectral Count",
        series: vec![ScatterSeries {
            label: "All Data".to_string(),
            points: positive_y(xy_points(df, SEQUENCE_DISTANCE, SPECTRAL_COUNT)?),
            color: BLUE_POINTS,
        }],
        vertical_line: None,
        horizontal_line: Some(20.0),
        log_y: true,
    };
    draw_scatter_plot(output_path, &plot)
}

/// One cumulative curve per labelled dataset, with a reference line at `ca_reference`.
pub fn plot_ca_distance_cumulative_percentage(
    datasets: &[(&str, &DataFrame)],
    ca_reference: f64,
    output_path: &str,
) -> PolarsResult<()> {
    let mut curves = Vec::with_capacity(datasets.len());
    for &(label, df) in datasets {
        curves.push((label, cumulative_percentage(&f64_values(df, CA_DISTANCE)?)));
    }

    let x_hi = upper_bound(
        curves.iter().flat_map(|(_, c)| c.iter().map(|(x, _)| x)),
        ca_reference,
    );

    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| polars_err(Box::new(e)))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Cumulative Percentage of Crosslinks <= C-alpha Distance",
            ("sans-serif", 24),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_hi, 0.0..100.0)
        .map_err(|e| polars_err(Box::new(e)))?;

    chart
        .configure_mesh()
        .x_desc("C-alpha Distance (Å)")
        .y_desc("Cumulative Percentage (%)")
        .axis_desc_style(("sans-serif", 20))
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| polars_err(Box::new(e)))?;

    for (i, (label, curve)) in curves.iter().enumerate() {
        let colour = CURVE_COLOURS[i % CURVE_COLOURS.len()];
        chart
            .draw_series(LineSeries::new(curve.iter().copied(), colour.stroke_width(2)))
            .map_err(|e| polars_err(Box::new(e)))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], colour.stroke_width(3)));
    }

    chart
        .draw_series(LineSeries::new(
            vec![(ca_reference, 0.0), (ca_reference, 100.0)],
            RED.stroke_width(2),
        ))
        .map_err(|e| polars_err(Box::new(e)))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 18))
        .position(SeriesLabelPosition::LowerRight)
        .draw()
        .map_err(|e| polars_err(Box::new(e)))?;

    root.present().map_err(|e| polars_err(Box::new(e)))?;
    info!("Saved cumulative CA distance plot to {}", output_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn cumulative_curve_is_sorted_and_ends_at_100() {
        let curve = cumulative_percentage(&[30.0, 10.0, f64::NAN, 20.0, 20.0]);
        assert_eq!(
            curve,
            vec![(10.0, 25.0), (20.0, 50.0), (20.0, 75.0), (30.0, 100.0)]
        );
        assert!(cumulative_percentage(&[]).is_empty());
    }

    #[test]
    fn points_skip_missing_values() {
        let df = df![
            "Sequence Distance" => &[Some(10i64), None, Some(600)],
            "CA Distance" => &[Some(12.5), Some(30.0), Some(44.0)]
        ]
        .unwrap();
        let points = xy_points(&df, SEQUENCE_DISTANCE, CA_DISTANCE).unwrap();
        assert_eq!(points, vec![(10.0, 12.5), (600.0, 44.0)]);
    }

    #[test]
    fn log_axis_bounds_ignore_non_positive_values() {
        let (lo, hi) = log_bounds([0.0, 2.0, 50.0].iter());
        assert!((lo - 1.6).abs() < 1e-12);
        assert!((hi - 62.5).abs() < 1e-12);
        assert_eq!(log_bounds([0.0].iter()), (1.0, 10.0));
    }
}
