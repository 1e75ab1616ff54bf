//! # FTIR 谱图绘制
//!
//! 绘制红外光谱并以半透明色块标出积分窗口。
//! 波数轴按红外惯例从大到小显示。
//!
//! ## 依赖关系
//! - 被 `commands/ftir.rs` 调用
//! - 使用 `plotters` 渲染图表

use crate::error::{LabError, Result};
use crate::models::Spectrum;

use plotters::prelude::*;
use std::path::Path;

/// 生成 FTIR 谱图
pub fn generate_ftir_plot(
    spectrum: &Spectrum,
    windows: &[(f64, f64)],
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_ftir_chart(&root, spectrum, windows, title)?;
        root.present().map_err(|e| LabError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_ftir_chart(&root, spectrum, windows, title)?;
        root.present().map_err(|e| LabError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 绘制谱线与窗口色块
fn draw_ftir_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    spectrum: &Spectrum,
    windows: &[(f64, f64)],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    let (x_lo, x_hi) = spectrum.x_range().unwrap_or((400.0, 4000.0));
    let y_lo = spectrum.y.iter().copied().fold(f64::INFINITY, f64::min);
    let y_hi = spectrum.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (y_lo, y_hi) = if y_lo.is_finite() && y_hi > y_lo {
        let pad = (y_hi - y_lo) * 0.05;
        (y_lo - pad, y_hi + pad)
    } else {
        (0.0, 1.0)
    };

    // 红外惯例：波数从大到小
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_hi..x_lo, y_lo..y_hi)
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Wavenumber (cm⁻¹)")
        .y_desc("Absorbance (a.u.)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    // 积分窗口色块
    let shade = RGBColor(0, 102, 204).mix(0.15);
    for &(lo, hi) in windows {
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(hi, y_lo), (lo, y_hi)],
                shade.filled(),
            )))
            .map_err(|e| LabError::Other(format!("{:?}", e)))?;
    }

    let line_color = RGBColor(51, 51, 51);
    let mut data: Vec<(f64, f64)> = spectrum
        .x
        .iter()
        .copied()
        .zip(spectrum.y.iter().copied())
        .collect();
    data.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    chart
        .draw_series(LineSeries::new(data, line_color.stroke_width(2)))
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    Ok(())
}
