//! Static Chart Renderer
//! Draws chart models into RGB buffers with plotters and encodes them as PNG.
//!
//! Colours come from the interactive plotter's palette so a saved image
//! matches what is on screen.

use super::model::{AreaChart, BarChart, BubbleChart, ChartData, LineChart, PieChart, BUBBLE_SIZE_MAX};
use super::plotter::{ChartPlotter, BAR_COLOR};
use crate::data::{Month, EXPORTS, PRODUCTION};
use egui::Color32;
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use rayon::prelude::*;
use std::f64::consts::TAU;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid image size {0}x{1}")]
    InvalidSize(u32, u32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render a chart into a packed RGB8 buffer of `width * height * 3` bytes.
    pub fn render_to_rgb(chart: &ChartData, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize(width, height));
        }

        let mut buffer = vec![255u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| RenderError::Drawing(e.to_string()))?;
            Self::draw(&root, chart).map_err(|e| RenderError::Drawing(e.to_string()))?;
            root.present()
                .map_err(|e| RenderError::Drawing(e.to_string()))?;
        }
        Ok(buffer)
    }

    /// Render a chart to in-memory PNG bytes.
    pub fn render_png_bytes(chart: &ChartData, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let rgb = Self::render_to_rgb(chart, width, height)?;
        let img = RgbImage::from_raw(width, height, rgb).ok_or(RenderError::InvalidSize(width, height))?;

        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn save_png(chart: &ChartData, path: &Path, width: u32, height: u32) -> Result<(), RenderError> {
        let bytes = Self::render_png_bytes(chart, width, height)?;
        std::fs::write(path, bytes)?;
        debug!(path = %path.display(), chart = chart.title(), "chart saved");
        Ok(())
    }

    /// Render every chart into `dir` in parallel, one `<file_stem>.png` each.
    pub fn export_all(
        charts: &[ChartData],
        dir: &Path,
        width: u32,
        height: u32,
    ) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir)?;

        let paths: Vec<PathBuf> = charts
            .par_iter()
            .map(|chart| {
                let path = dir.join(format!("{}.png", chart.file_stem()));
                Self::save_png(chart, &path, width, height)?;
                Ok(path)
            })
            .collect::<Result<_, RenderError>>()?;

        info!(count = paths.len(), dir = %dir.display(), "charts exported");
        Ok(paths)
    }

    fn draw(root: &Area<'_>, chart: &ChartData) -> DrawResult {
        match chart {
            ChartData::Pie(c) => Self::draw_pie(root, c),
            ChartData::Line(c) => Self::draw_line(root, c),
            ChartData::Bar(c) => Self::draw_bar(root, c),
            ChartData::Bubble(c) => Self::draw_bubble(root, c),
            ChartData::Area(c) => Self::draw_area(root, c),
        }
    }

    fn draw_line(root: &Area<'_>, chart: &LineChart) -> DrawResult {
        let names: Vec<String> = chart.series.iter().map(|s| s.name.clone()).collect();
        let (x0, x1) = padded(chart.year_range(), 0.5);
        let year_count = (x1 - x0).round().max(1.0) as usize;

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x0..x1, 0.0..headroom(chart.value_max()))?;

        ctx.configure_mesh()
            .x_desc("Year")
            .y_desc(chart.y_label.as_str())
            .x_labels(year_count + 1)
            .x_label_formatter(&whole_number)
            .draw()?;

        for series in &chart.series {
            let color = rgb(ChartPlotter::product_color(&names, &series.name));
            ctx.draw_series(LineSeries::new(
                series.points.iter().map(|p| (p[0], p[1])),
                color.stroke_width(2),
            ))?
            .label(series.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            ctx.draw_series(
                series
                    .points
                    .iter()
                    .map(|p| Circle::new((p[0], p[1]), 4, color.filled())),
            )?;
        }

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_bar(root: &Area<'_>, chart: &BarChart) -> DrawResult {
        let bar = rgb(BAR_COLOR);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5..11.5, 0.0..headroom(chart.value_max()))?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc("Month")
            .y_desc(chart.y_label.as_str())
            .x_labels(12)
            .x_label_formatter(&month_label)
            .draw()?;

        ctx.draw_series(chart.bars.iter().map(|(month, value)| {
            let x = month.index() as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *value)], bar.filled())
        }))?;
        Ok(())
    }

    fn draw_bubble(root: &Area<'_>, chart: &BubbleChart) -> DrawResult {
        let (x0, x1) = padded(chart.production_range(), 1.0);
        let (y0, y1) = padded(chart.exports_range(), 1.0);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        ctx.configure_mesh()
            .x_desc(PRODUCTION)
            .y_desc(EXPORTS)
            .draw()?;

        for (i, product) in chart.products.iter().enumerate() {
            let color = rgb(ChartPlotter::series_color(i));
            ctx.draw_series(
                chart
                    .bubbles
                    .iter()
                    .filter(|b| &b.product == product)
                    .map(|b| {
                        let radius = (chart.diameter(b, BUBBLE_SIZE_MAX) / 2.0).max(1.0) as i32;
                        Circle::new((b.production, b.exports), radius, color.mix(0.6).filled())
                    }),
            )?
            .label(product.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
        }

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_area(root: &Area<'_>, chart: &AreaChart) -> DrawResult {
        let layers = chart.stacked();
        let names: Vec<String> = layers.iter().map(|l| l.name.clone()).collect();

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5..11.5, 0.0..headroom(chart.stack_max()))?;

        ctx.configure_mesh()
            .x_desc("Month")
            .y_desc(chart.y_label.as_str())
            .x_labels(12)
            .x_label_formatter(&month_label)
            .draw()?;

        for layer in &layers {
            let color = rgb(ChartPlotter::product_color(&names, &layer.name));
            let outline: Vec<(f64, f64)> = layer
                .upper
                .iter()
                .chain(layer.lower.iter().rev())
                .map(|p| (p[0], p[1]))
                .collect();

            ctx.draw_series(std::iter::once(Polygon::new(outline, color.mix(0.6).filled())))?
                .label(layer.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));

            ctx.draw_series(LineSeries::new(
                layer.upper.iter().map(|p| (p[0], p[1])),
                color.stroke_width(2),
            ))?;
        }

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_pie(root: &Area<'_>, chart: &PieChart) -> DrawResult {
        let labels: Vec<String> = chart.slices.iter().map(|s| s.label.clone()).collect();
        let area = root.titled(&chart.title, (FONT, 24))?;

        let (w, h) = area.dim_in_pixel();
        let (cx, cy) = (w as i32 / 2, h as i32 / 2);
        let radius = f64::from(w.min(h)) * 0.4;
        let at = |angle: f64, r: f64| {
            (
                cx + (angle.sin() * r).round() as i32,
                cy - (angle.cos() * r).round() as i32,
            )
        };

        for (i, (start, end)) in chart.wedges().into_iter().enumerate() {
            let slice = &chart.slices[i];
            let color = rgb(ChartPlotter::product_color(&labels, &slice.label));
            let steps = (((end - start) / TAU) * 180.0).ceil().max(1.0) as usize;

            let mut outline = vec![(cx, cy)];
            outline.extend(
                (0..=steps).map(|s| at(start + (end - start) * s as f64 / steps as f64, radius)),
            );
            area.draw(&Polygon::new(outline, color.filled()))?;
            area.draw(&PathElement::new(vec![(cx, cy), at(start, radius)], BLACK))?;

            let share = chart.share(i);
            if share > 0.0 {
                let (lx, ly) = at((start + end) / 2.0, radius * 0.65);
                area.draw(&Text::new(
                    format!("{} {:.1}%", slice.label, share * 100.0),
                    (lx - 40, ly - 8),
                    (FONT, 18).into_font().color(&BLACK),
                ))?;
            }
        }
        Ok(())
    }
}

fn rgb(c: Color32) -> RGBColor {
    RGBColor(c.r(), c.g(), c.b())
}

/// Widen a (min, max) range so single points and flat data still get an axis.
fn padded(range: Option<(f64, f64)>, pad: f64) -> (f64, f64) {
    match range {
        Some((lo, hi)) if hi > lo => {
            let margin = ((hi - lo) * 0.05).max(pad.min(hi - lo));
            (lo - margin, hi + margin)
        }
        Some((lo, _)) => (lo - pad, lo + pad),
        None => (0.0, 1.0),
    }
}

fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn whole_number(x: &f64) -> String {
    if (x - x.round()).abs() < 1e-9 {
        format!("{:.0}", x)
    } else {
        String::new()
    }
}

fn month_label(x: &f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-9 || rounded < 0.0 {
        return String::new();
    }
    Month::from_index(rounded as usize)
        .map(|m| m.short_name().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::model::Measure;

    #[test]
    fn padded_handles_flat_and_missing_ranges() {
        assert_eq!(padded(None, 1.0), (0.0, 1.0));
        assert_eq!(padded(Some((5.0, 5.0)), 0.5), (4.5, 5.5));
        let (lo, hi) = padded(Some((0.0, 100.0)), 1.0);
        assert!(lo < 0.0 && hi > 100.0);
    }

    #[test]
    fn month_labels_only_on_whole_ticks() {
        assert_eq!(month_label(&0.0), "Jan");
        assert_eq!(month_label(&11.0), "Dec");
        assert_eq!(month_label(&2.5), "");
        assert_eq!(month_label(&12.0), "");
        assert_eq!(month_label(&-1.0), "");
    }

    #[test]
    fn zero_sized_render_is_rejected() {
        let chart = ChartData::Bar(BarChart::monthly_average(&[], Measure::Exports));
        assert!(matches!(
            ChartRenderer::render_to_rgb(&chart, 0, 10),
            Err(RenderError::InvalidSize(0, 10))
        ));
    }
}
