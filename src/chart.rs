use plotters::coord::Shift;
use plotters::prelude::*;

use std::path::Path;

use log::*;

use crate::Error;

const CHART_SIZE: (u32, u32) = (640, 480);

const BAR_COLORS: [RGBColor; 6] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
];

pub fn render_failure<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> Error {
    Error::RenderError(err.to_string())
}

/// One bar per label, in the order given
pub fn draw_counts<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    x_desc: &str,
    counts: &[(&str, usize)],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let bars = counts.len() as u32;
    let tallest = counts.iter().map(|(_, count)| *count).max().unwrap_or(0) as u32;
    let mut chart = ChartBuilder::on(root)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..bars).into_segmented(), 0..tallest + 1)?;

    let label_of = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => counts
            .get(*i as usize)
            .map(|(label, _)| label.to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(counts.len() + 1)
        .x_label_formatter(&label_of)
        .x_desc(x_desc)
        .y_desc("count")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, (_, count))| {
        let i = i as u32;
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0),
                (SegmentValue::Exact(i + 1), *count as u32),
            ],
            BAR_COLORS[i as usize % BAR_COLORS.len()].filled(),
        );
        bar.set_margin(0, 0, 10, 10);
        bar
    }))?;

    root.present()
}

pub fn counts_svg(x_desc: &str, counts: &[(&str, usize)]) -> Result<String, Error> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw_counts(&root, x_desc, counts).map_err(render_failure)?;
    }
    Ok(svg)
}

pub fn save_counts(path: &Path, x_desc: &str, counts: &[(&str, usize)]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, counts_svg(x_desc, counts)?)?;
    debug!("Chart: Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_one_bar_per_label() -> Result<()> {
        let svg = counts_svg(
            "predicted_sentiment",
            &[("positive", 4), ("negative", 2), ("neutral", 1)],
        )?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains("positive"));
        assert!(svg.contains("negative"));
        assert!(svg.contains("neutral"));
        assert!(svg.contains("predicted_sentiment"));
        Ok(())
    }

    #[test]
    fn test_writes_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out").join("sentiment_distribution.svg");
        save_counts(&path, "predicted_sentiment", &[("positive", 1)])?;
        assert!(std::fs::read_to_string(&path)?.contains("positive"));
        Ok(())
    }
}
