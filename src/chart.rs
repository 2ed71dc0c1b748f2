//! Rasterises a runtime dataset into a line chart.
//!
//! The chart is drawn with `plotters` into an in-memory RGB buffer; the
//! resulting image is what the report embeds as its chart snapshot.  Text on
//! the chart (axis titles, tick labels, legend) needs a TrueType font that has
//! been handed to [`register_label_font`].  Without one the chart is still
//! drawn, with series, grid and reference line only.

use std::fmt::Display;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbImage;
use log::{debug, info};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};

use crate::dataset::RuntimeDataset;
use crate::error::ChartError;
use crate::format;
use crate::model::Rgb;

const FONT_FAMILY: &str = "sans-serif";

static LABEL_FONT_REGISTERED: AtomicBool = AtomicBool::new(false);

/// Registers the font used for every label on the chart.
///
/// Must be called once before rendering for the chart to carry text.  Later calls
/// are ignored once a font has been accepted.
pub fn register_label_font(bytes: Vec<u8>) -> Result<(), ChartError> {
    if LABEL_FONT_REGISTERED.load(Ordering::SeqCst) {
        return Ok(());
    }
    // plotters keeps a reference to the font data for the rest of the process.
    let data: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FONT_FAMILY, FontStyle::Normal, data).map_err(|_| ChartError::InvalidFont)?;
    LABEL_FONT_REGISTERED.store(true, Ordering::SeqCst);
    info!("chart label font registered");
    Ok(())
}

/// Whether chart text can be drawn.
pub fn labels_enabled() -> bool {
    LABEL_FONT_REGISTERED.load(Ordering::SeqCst)
}

/// The horizontal "runtime target" marker.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceLine {
    pub minutes: f64,
    pub label: String,
    pub color: Rgb,
    pub width_px: u32,
    /// Dash and gap length in pixels.
    pub dash_px: (u32, u32),
}

impl Default for ReferenceLine {
    fn default() -> Self {
        Self {
            minutes: 60.0,
            label: "60 min".to_owned(),
            color: Rgb::new(255, 0, 0),
            width_px: 2,
            dash_px: (5, 5),
        }
    }
}

/// Appearance of the rasterised chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartStyle {
    pub width_px: u32,
    pub height_px: u32,
    pub background: Rgb,
    pub grid: Rgb,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub line_width_px: u32,
    pub point_radius_px: u32,
    pub reference: Option<ReferenceLine>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width_px: 1500,
            height_px: 750,
            background: Rgb::WHITE,
            grid: Rgb::BLACK.blend_over(Rgb::WHITE, 0.06),
            x_axis_title: "Load in Watts".to_owned(),
            y_axis_title: "Time in Minutes".to_owned(),
            line_width_px: 3,
            point_radius_px: 4,
            reference: Some(ReferenceLine::default()),
        }
    }
}

/// Upper bound of the runtime axis: 10% headroom rounded up to a tidy step.
pub fn y_axis_max(max_runtime: f64) -> f64 {
    let padded = (max_runtime * 1.1).max(0.0);
    let step = if padded > 200.0 { 50.0 } else { 10.0 };
    ((padded / step).ceil() * step).max(10.0)
}

/// Whether `line` falls inside a runtime axis that ends at `y_max`.
pub fn reference_line_visible(line: &ReferenceLine, y_max: f64) -> bool {
    line.minutes >= 0.0 && line.minutes <= y_max
}

/// Tick label at `value` on the load axis: `"<load>W"` at a load point, empty elsewhere.
pub fn tick_label(load_points: &[f64], value: f64) -> String {
    load_points
        .iter()
        .find(|load| (**load - value).abs() <= 1e-9 * load.abs().max(1.0))
        .map(|load| format!("{}W", format::format_number(*load)))
        .unwrap_or_default()
}

/// Load axis span: first to last load point, widened around a lone point.
pub fn load_axis_range(load_points: &[f64]) -> Range<f64> {
    let first = load_points.first().copied().unwrap_or(0.0);
    let last = load_points.last().copied().unwrap_or(first);
    if last > first {
        first..last
    } else {
        let pad = (first.abs() * 0.5).max(1.0);
        (first - pad)..(first + pad)
    }
}

/// Linear watt axis whose ticks sit exactly on the load points.
struct LoadAxis {
    linear: RangedCoordf64,
    ticks: Vec<f64>,
}

impl LoadAxis {
    fn new(load_points: &[f64]) -> Self {
        Self {
            linear: load_axis_range(load_points).into(),
            ticks: load_points.to_vec(),
        }
    }
}

impl Ranged for LoadAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.linear.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.max_num_points() == 0 {
            return Vec::new();
        }
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.linear.range()
    }
}

fn grid_step(y_max: f64) -> f64 {
    if y_max > 200.0 {
        50.0
    } else if y_max > 50.0 {
        20.0
    } else {
        10.0
    }
}

/// Dash segments covering `span`, as `(start, end)` pairs in axis units.
fn dash_segments(span: Range<f64>, dash: f64, gap: f64) -> Vec<(f64, f64)> {
    let mut dashes = Vec::new();
    if dash <= 0.0 {
        return dashes;
    }
    let mut start = span.start;
    while start < span.end {
        let end = (start + dash).min(span.end);
        dashes.push((start, end));
        start = end + gap;
    }
    dashes
}

fn render_error(err: impl Display) -> ChartError {
    ChartError::Render(err.to_string())
}

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.r, rgb.g, rgb.b)
}

/// Draws runtime datasets with a fixed [`ChartStyle`].
#[derive(Clone, Debug, Default)]
pub struct ChartRenderer {
    style: ChartStyle,
}

impl ChartRenderer {
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }

    /// Renders `dataset` to an RGB image of the configured size.
    pub fn render(&self, dataset: &RuntimeDataset) -> Result<RgbImage, ChartError> {
        let (width, height) = (self.style.width_px, self.style.height_px);
        if width == 0 || height == 0 {
            return Err(ChartError::InvalidSize { width, height });
        }

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        self.draw(dataset, &mut buffer)?;
        debug!(
            "rendered {} kVA chart at {}x{} px (labels: {})",
            dataset.rating(),
            width,
            height,
            labels_enabled()
        );
        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| ChartError::Render("pixel buffer has the wrong length".to_owned()))
    }

    fn draw(&self, dataset: &RuntimeDataset, buffer: &mut [u8]) -> Result<(), ChartError> {
        let style = &self.style;
        let labels = labels_enabled();
        let root = BitMapBackend::with_buffer(buffer, (style.width_px, style.height_px))
            .into_drawing_area();
        root.fill(&color(style.background)).map_err(render_error)?;

        let load_points = dataset.load_points();
        let y_max = y_axis_max(dataset.max_runtime());
        let x_span = load_axis_range(load_points);

        let mut builder = ChartBuilder::on(&root);
        builder.margin(24);
        if labels {
            builder
                .caption(
                    format!("{} Runtime", dataset.rating().display_label()),
                    (FONT_FAMILY, 32),
                )
                .x_label_area_size(70)
                .y_label_area_size(90);
        }
        let mut chart = builder
            .build_cartesian_2d(LoadAxis::new(load_points), 0f64..y_max)
            .map_err(render_error)?;

        let grid = color(style.grid);
        if labels {
            let formatter = |value: &f64| tick_label(load_points, *value);
            chart
                .configure_mesh()
                .x_labels(load_points.len())
                .x_label_formatter(&formatter)
                .y_labels(10)
                .x_desc(style.x_axis_title.as_str())
                .y_desc(style.y_axis_title.as_str())
                .label_style((FONT_FAMILY, 18))
                .axis_desc_style((FONT_FAMILY, 22))
                .bold_line_style(grid)
                .light_line_style(TRANSPARENT)
                .draw()
                .map_err(render_error)?;
        } else {
            let step = grid_step(y_max);
            let rows = (y_max / step).floor() as usize;
            chart
                .draw_series((0..=rows).map(|row| {
                    let y = row as f64 * step;
                    PathElement::new(vec![(x_span.start, y), (x_span.end, y)], grid.stroke_width(1))
                }))
                .map_err(render_error)?;
            chart
                .draw_series(load_points.iter().map(|load| {
                    PathElement::new(vec![(*load, 0.0), (*load, y_max)], grid.stroke_width(1))
                }))
                .map_err(render_error)?;
        }

        for series in dataset.series() {
            let stroke = color(series.color());
            let points: Vec<(f64, f64)> = load_points
                .iter()
                .copied()
                .zip(series.values().iter().copied())
                .collect();

            let line = chart
                .draw_series(LineSeries::new(
                    points.clone(),
                    stroke.stroke_width(style.line_width_px),
                ))
                .map_err(render_error)?;
            if labels {
                let width = style.line_width_px;
                line.label(series.name()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 24, y)], stroke.stroke_width(width))
                });
            }

            let radius = style.point_radius_px;
            chart
                .draw_series(
                    points
                        .into_iter()
                        .map(|point| Circle::new(point, radius, stroke.filled())),
                )
                .map_err(render_error)?;
        }

        if let Some(reference) = style
            .reference
            .as_ref()
            .filter(|reference| reference_line_visible(reference, y_max))
        {
            let stroke = color(reference.color);
            let (plot_width, _) = chart.plotting_area().dim_in_pixel();
            let units_per_px = (x_span.end - x_span.start) / f64::from(plot_width.max(1));
            let y = reference.minutes;
            let width = reference.width_px;
            chart
                .draw_series(
                    dash_segments(
                        x_span.clone(),
                        f64::from(reference.dash_px.0) * units_per_px,
                        f64::from(reference.dash_px.1) * units_per_px,
                    )
                    .into_iter()
                    .map(|(from, to)| {
                        PathElement::new(vec![(from, y), (to, y)], stroke.stroke_width(width))
                    }),
                )
                .map_err(render_error)?;

            if labels {
                let label_style = (FONT_FAMILY, 18)
                    .into_font()
                    .color(&stroke)
                    .pos(Pos::new(HPos::Right, VPos::Bottom));
                chart
                    .draw_series(std::iter::once(Text::new(
                        reference.label.clone(),
                        (x_span.end, y),
                        label_style,
                    )))
                    .map_err(render_error)?;
            }
        }

        if labels {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperMiddle)
                .label_font((FONT_FAMILY, 18))
                .background_style(WHITE.mix(0.85))
                .border_style(grid)
                .draw()
                .map_err(render_error)?;
        }

        root.present().map_err(render_error)
    }
}
