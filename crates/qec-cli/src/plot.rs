//! Two-panel histogram of the result and syndrome registers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use qec_hal::Counts;

/// Canvas size in pixels (10 x 8 inches at 100 dpi).
pub const FIGURE_SIZE: (u32, u32) = (1000, 800);

pub const FIGURE_TITLE: &str = "Quantum Error Correction Results";
pub const RESULT_TITLE: &str = "Result Register Counts";
pub const SYNDROME_TITLE: &str = "Syndrome Register Counts";

/// Family every label is drawn with. plotters has no system font lookup in
/// this build, so the family is backed by the embedded DejaVu Sans.
const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Errors raised while rendering or saving a plot.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to draw histogram: {0}")]
    Draw(String),

    #[error("Failed to load plot font: {0}")]
    Font(String),
}

pub type PlotResult<T> = Result<T, PlotError>;

fn draw_err(e: impl fmt::Display) -> PlotError {
    PlotError::Draw(e.to_string())
}

/// Register the embedded font once per process.
fn ensure_font() -> PlotResult<()> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES)
                .map_err(|_| "embedded DejaVu Sans is not a valid font".to_string())
        })
        .clone()
        .map_err(PlotError::Font)
}

/// Image encoding for saved plots.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One bar chart in the figure.
struct Panel<'a> {
    title: &'a str,
    counts: &'a Counts,
    color: RGBColor,
}

/// Path the plot for `job_id` is written to.
pub fn output_path(dir: &Path, job_id: &str, format: ImageFormat) -> PathBuf {
    dir.join(format!("3bit_qec_result_{job_id}.{}", format.extension()))
}

/// Render both register histograms and save them under `dir`.
///
/// Creates `dir` if missing and returns the written file's path.
pub fn save_histograms(
    result_counts: &Counts,
    syndrome_counts: &Counts,
    dir: &Path,
    job_id: &str,
    format: ImageFormat,
) -> PlotResult<PathBuf> {
    ensure_font()?;
    std::fs::create_dir_all(dir).map_err(|source| PlotError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = output_path(dir, job_id, format);

    let panels = [
        Panel {
            title: RESULT_TITLE,
            counts: result_counts,
            color: BLUE,
        },
        Panel {
            title: SYNDROME_TITLE,
            counts: syndrome_counts,
            color: RED,
        },
    ];

    match format {
        ImageFormat::Png => {
            draw_figure(BitMapBackend::new(&path, FIGURE_SIZE).into_drawing_area(), &panels)?;
        }
        ImageFormat::Svg => {
            draw_figure(SVGBackend::new(&path, FIGURE_SIZE).into_drawing_area(), &panels)?;
        }
    }

    debug!(path = %path.display(), "histogram saved");
    Ok(path)
}

fn draw_figure<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    panels: &[Panel<'_>],
) -> PlotResult<()> {
    root.fill(&WHITE).map_err(draw_err)?;
    let body = root
        .titled(FIGURE_TITLE, (FONT_FAMILY, 28.0))
        .map_err(draw_err)?;

    let areas = body.split_evenly((panels.len(), 1));
    for (area, panel) in areas.iter().zip(panels) {
        draw_panel(area, panel)?;
    }

    root.present().map_err(draw_err)
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel<'_>,
) -> PlotResult<()> {
    let bars = panel.counts.by_bitstring();
    let labels: Vec<&str> = bars.iter().map(|(bits, _)| bits.as_str()).collect();
    let max_count = bars.iter().map(|&(_, &count)| count).max().unwrap_or(0);
    let num_bars = u32::try_from(bars.len().max(1)).unwrap_or(u32::MAX);

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, (FONT_FAMILY, 20.0))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..num_bars).into_segmented(), 0u64..headroom(max_count))
        .map_err(draw_err)?;

    let label = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(i) => labels
            .get(*i as usize)
            .map(|s| (*s).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Bitstring")
        .y_desc("Count")
        .x_labels(bars.len().max(1))
        .x_label_formatter(&label)
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(panel.color.filled())
                .margin(10)
                .data(
                    bars.iter()
                        .enumerate()
                        .map(|(i, &(_, &count))| (i as u32, count)),
                ),
        )
        .map_err(draw_err)?;

    Ok(())
}

/// Upper bound of the count axis, leaving room above the tallest bar.
fn headroom(max_count: u64) -> u64 {
    (max_count + max_count / 10).max(1) + 1
}
