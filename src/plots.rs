//! Plot rendering with `plotters`.
//!
//! Every chart is drawn against a generic `DrawingBackend` so the same code
//! produces PNG (bitmap) and SVG output. Files are named after the chart
//! title: `<output_dir>/<title>.<ext>`.

use std::f64::consts::PI;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};

use crate::analysis::{CountEntry, MailAnalysis};
use crate::countries;
use crate::errors::{IoResultExt, MailOriginError, Result};

pub const DOMAINS_TITLE: &str = "Domains";
pub const TLD_TITLE: &str = "top_level_domains";
pub const WORLDMAP_TITLE: &str = "origin_worldmap";
pub const PIEPLOT_TITLE: &str = "origin_pieplot";

/// Image format of the written plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            other => Err(format!("Unknown export format '{other}'. Use 'png' or 'svg'.")),
        }
    }
}

/// Canvas sizes in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSizes {
    pub bar: (u32, u32),
    pub pie: (u32, u32),
    pub world: (u32, u32),
}

impl Default for PlotSizes {
    fn default() -> Self {
        Self {
            bar: (1500, 800),
            pie: (1500, 1500),
            world: (2500, 1250),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<CountEntry>,
}

#[derive(Debug, Clone)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<CountEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldPoint {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct WorldPlot {
    pub title: String,
    pub points: Vec<WorldPoint>,
}

impl WorldPlot {
    /// Place every counted country on its centroid. Codes without
    /// metadata are dropped.
    pub fn from_counts(title: impl Into<String>, counts: &[CountEntry]) -> Self {
        let points = counts
            .iter()
            .filter_map(|entry| {
                countries::lookup_alpha3(&entry.label).map(|c| WorldPoint {
                    code: c.alpha3.to_string(),
                    latitude: c.latitude,
                    longitude: c.longitude,
                    count: entry.count,
                })
            })
            .collect();
        Self {
            title: title.into(),
            points,
        }
    }
}

/// Diverging blue-grey-red colour map, `t` in `[0, 1]`.
pub fn coolwarm(t: f64) -> RGBColor {
    const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let (from, to, local) = if t < 0.5 {
        (COOL, MID, t * 2.0)
    } else {
        (MID, WARM, (t - 0.5) * 2.0)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * local).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// `n` evenly spaced samples of the colour map.
pub fn coolwarm_palette(n: usize) -> Vec<RGBColor> {
    match n {
        0 => Vec::new(),
        1 => vec![coolwarm(0.5)],
        _ => (0..n)
            .map(|i| coolwarm(i as f64 / (n - 1) as f64))
            .collect(),
    }
}

/// Normalise `count` into `[0, 1]` between `min` and `max`.
pub fn color_scale(count: usize, min: usize, max: usize) -> f64 {
    if max <= min {
        return 1.0;
    }
    (count.saturating_sub(min)) as f64 / (max - min) as f64
}

/// Outline of a pie wedge in pixel space, counter-clockwise from `start`
/// to `end` (radians, 0 = three o'clock).
pub fn wedge_points(center: (i32, i32), radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = (((end - start).abs() / (PI / 180.0)).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let a = start + (end - start) * i as f64 / steps as f64;
        points.push(polar(center, radius, a));
    }
    points
}

fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 - (radius * angle.sin()).round() as i32,
    )
}

/// Percentage label as shown inside each wedge.
pub fn percent_label(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

type DrawResult<DB> =
    std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// X axis of a bar chart: one unit-wide slot per bar, ticks at the slot
/// centres. A chart without bars still gets a single empty slot.
pub fn bar_axis(bars: usize) -> (Range<f64>, Vec<f64>) {
    let slots = bars.max(1);
    let centres = (0..slots).map(|i| i as f64 + 0.5).collect();
    (0.0..slots as f64, centres)
}

/// Label of the bar whose slot centre sits at `x`.
fn bar_label(labels: &[String], x: f64) -> String {
    let slot = (x - 0.5).round();
    if slot < 0.0 {
        return String::new();
    }
    labels.get(slot as usize).cloned().unwrap_or_default()
}

fn draw_barplot<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &BarChart,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let n = chart.bars.len();
    let y_max = chart.bars.iter().map(|b| b.count).max().unwrap_or(0) as u32;
    let y_top = y_max + (y_max / 10).max(1);
    let palette = coolwarm_palette(n);
    let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();
    let (x_range, ticks) = bar_axis(n);

    let tick_font = ("sans-serif", 16).into_font();
    let tick_style: TextStyle = if n > 8 {
        tick_font.transform(FontTransform::Rotate90).into()
    } else {
        tick_font.into()
    };

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(if n > 8 { 160 } else { 50 })
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.with_key_points(ticks), 0u32..y_top)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n.max(1))
        .x_label_style(tick_style)
        .x_label_formatter(&|x| bar_label(&labels, *x))
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
        let left = i as f64;
        let mut rect = Rectangle::new(
            [(left, 0u32), (left + 1.0, bar.count as u32)],
            palette[i].filled(),
        );
        rect.set_margin(0, 0, 6, 6);
        rect
    }))?;

    Ok(())
}

fn draw_pieplot<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &PieChart,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let area = root.titled(&chart.title, ("sans-serif", 40))?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;
    let total: usize = chart.slices.iter().map(|s| s.count).sum();
    if total == 0 {
        return Ok(());
    }

    // six colours cycled, like a seaborn palette
    let palette = coolwarm_palette(6);
    let mut start = 0.0_f64;
    for (i, slice) in chart.slices.iter().enumerate() {
        let sweep = 2.0 * PI * slice.count as f64 / total as f64;
        let end = start + sweep;
        let color = palette[i % palette.len()];
        area.draw(&Polygon::new(
            wedge_points(center, radius, start, end),
            color.filled(),
        ))?;

        let mid = start + sweep / 2.0;
        let label_pos = polar(center, radius * 1.12, mid);
        let pct_pos = polar(center, radius * 0.6, mid);
        let h_pos = if mid.cos() >= 0.0 {
            HPos::Left
        } else {
            HPos::Right
        };
        area.draw(&Text::new(
            slice.label.clone(),
            label_pos,
            TextStyle::from(("sans-serif", 26).into_font()).pos(Pos::new(h_pos, VPos::Center)),
        ))?;
        area.draw(&Text::new(
            percent_label(slice.count, total),
            pct_pos,
            TextStyle::from(("sans-serif", 22).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        start = end;
    }

    Ok(())
}

fn draw_world_plot<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plot: &WorldPlot,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let (w, _) = root.dim_in_pixel();
    let (map_area, legend_area) = root.split_horizontally(w.saturating_sub(220));

    let min = plot.points.iter().map(|p| p.count).min().unwrap_or(0);
    let max = plot.points.iter().map(|p| p.count).max().unwrap_or(0);

    let mut ctx = ChartBuilder::on(&map_area)
        .caption(&plot.title, ("sans-serif", 50))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-180f64..180f64, -90f64..90f64)?;

    ctx.plotting_area()
        .fill(&RGBColor(211, 211, 211).mix(0.35))?;
    ctx.configure_mesh()
        .x_labels(13)
        .y_labels(7)
        .x_desc("Longitude")
        .y_desc("Latitude")
        .draw()?;

    let marker_size = |count: usize| -> i32 {
        let t = color_scale(count, min, max);
        (10.0 + 30.0 * t.sqrt()).round() as i32
    };

    ctx.draw_series(plot.points.iter().map(|p| {
        let color = coolwarm(color_scale(p.count, min, max));
        Circle::new(
            (p.longitude, p.latitude),
            marker_size(p.count),
            color.mix(0.85).filled(),
        )
    }))?;
    ctx.draw_series(plot.points.iter().map(|p| {
        Text::new(
            format!("{} ({})", p.code, p.count),
            (p.longitude + 3.0, p.latitude + 3.0),
            ("sans-serif", 20).into_font(),
        )
    }))?;

    // colour legend
    let upper = (max as f64).max(min as f64 + 1.0);
    let mut legend = ChartBuilder::on(&legend_area)
        .margin_top(120)
        .margin_bottom(120)
        .margin_left(20)
        .margin_right(20)
        .x_label_area_size(0)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..1f64, (min as f64)..upper)?;
    legend
        .configure_mesh()
        .x_labels(0)
        .disable_x_mesh()
        .disable_y_mesh()
        .y_desc("counts")
        .draw()?;
    let steps = 120usize;
    for i in 0..steps {
        let t0 = i as f64 / steps as f64;
        let t1 = (i + 1) as f64 / steps as f64;
        let y0 = min as f64 + (upper - min as f64) * t0;
        let y1 = min as f64 + (upper - min as f64) * t1;
        legend.draw_series(std::iter::once(Rectangle::new(
            [(0.0, y0), (1.0, y1)],
            coolwarm(t1).filled(),
        )))?;
    }

    Ok(())
}

macro_rules! render_with_backend {
    ($format:expr, $path:expr, $size:expr, $title:expr, $draw:ident, $data:expr) => {{
        match $format {
            ExportFormat::Png => {
                let root = BitMapBackend::new($path, $size).into_drawing_area();
                $draw(&root, $data).map_err(|e| MailOriginError::plot($title, e))?;
                root.present().map_err(|e| MailOriginError::plot($title, e))?;
            }
            ExportFormat::Svg => {
                let root = SVGBackend::new($path, $size).into_drawing_area();
                $draw(&root, $data).map_err(|e| MailOriginError::plot($title, e))?;
                root.present().map_err(|e| MailOriginError::plot($title, e))?;
            }
        }
    }};
}

pub fn render_barplot(
    path: &Path,
    format: ExportFormat,
    size: (u32, u32),
    chart: &BarChart,
) -> Result<()> {
    render_with_backend!(format, path, size, chart.title.as_str(), draw_barplot, chart);
    Ok(())
}

pub fn render_pieplot(
    path: &Path,
    format: ExportFormat,
    size: (u32, u32),
    chart: &PieChart,
) -> Result<()> {
    render_with_backend!(format, path, size, chart.title.as_str(), draw_pieplot, chart);
    Ok(())
}

pub fn render_world_plot(
    path: &Path,
    format: ExportFormat,
    size: (u32, u32),
    plot: &WorldPlot,
) -> Result<()> {
    render_with_backend!(format, path, size, plot.title.as_str(), draw_world_plot, plot);
    Ok(())
}

/// Result of rendering the full plot set.
#[derive(Debug, Clone, Default)]
pub struct PlotOutcome {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

/// The four charts produced for an analysis.
pub struct PlotSet<'a> {
    output_dir: &'a Path,
    format: ExportFormat,
    sizes: &'a PlotSizes,
}

impl<'a> PlotSet<'a> {
    pub fn new(output_dir: &'a Path, format: ExportFormat, sizes: &'a PlotSizes) -> Self {
        Self {
            output_dir,
            format,
            sizes,
        }
    }

    /// `<output_dir>/<title>.<ext>`
    pub fn path_for(&self, title: &str) -> PathBuf {
        self.output_dir
            .join(format!("{title}.{}", self.format.extension()))
    }

    pub fn render_all(&self, analysis: &MailAnalysis) -> Result<PlotOutcome> {
        std::fs::create_dir_all(self.output_dir)
            .with_path(self.output_dir.display().to_string(), "create output directory")?;

        let mut outcome = PlotOutcome::default();

        let domains = BarChart {
            title: DOMAINS_TITLE.to_string(),
            x_label: "Domains".to_string(),
            y_label: "Number of occurrences".to_string(),
            bars: analysis.domain_bars.clone(),
        };
        self.bar(&domains, &mut outcome)?;

        let tlds = BarChart {
            title: TLD_TITLE.to_string(),
            x_label: "top_level_domains".to_string(),
            y_label: "count".to_string(),
            bars: analysis.tld_counts.clone(),
        };
        self.bar(&tlds, &mut outcome)?;

        let world = WorldPlot::from_counts(WORLDMAP_TITLE, &analysis.country_counts);
        if world.points.is_empty() {
            outcome
                .skipped
                .push(format!("{WORLDMAP_TITLE}: no address with a known origin"));
        } else {
            let path = self.path_for(&world.title);
            render_world_plot(&path, self.format, self.sizes.world, &world)?;
            outcome.written.push(path);
        }

        let pie = PieChart {
            title: PIEPLOT_TITLE.to_string(),
            slices: analysis.country_counts.clone(),
        };
        if pie.slices.is_empty() {
            outcome
                .skipped
                .push(format!("{PIEPLOT_TITLE}: no address with a known origin"));
        } else {
            let path = self.path_for(&pie.title);
            render_pieplot(&path, self.format, self.sizes.pie, &pie)?;
            outcome.written.push(path);
        }

        Ok(outcome)
    }

    fn bar(&self, chart: &BarChart, outcome: &mut PlotOutcome) -> Result<()> {
        if chart.bars.iter().all(|b| b.count == 0) {
            outcome.skipped.push(format!("{}: no data", chart.title));
            return Ok(());
        }
        let path = self.path_for(&chart.title);
        render_barplot(&path, self.format, self.sizes.bar, chart)?;
        outcome.written.push(path);
        Ok(())
    }
}
