//! # XRF 校准曲线图表
//!
//! 每个元素一张图，每个峰一个子图：校准数据点带误差棒，
//! 叠加拟合直线并标注拟合参数与 r²。
//!
//! ## 依赖关系
//! - 被 `commands/xrf/calibrate.rs` 调用
//! - 使用 `xrf/calibration.rs` 的 PeakCalibration
//! - 使用 `plotters` 渲染图表

use crate::error::{LabError, Result};
use crate::xrf::PeakCalibration;

use plotters::prelude::*;
use std::path::Path;

/// 生成元素校准图
pub fn generate_calibration_plot(
    element: &str,
    peaks: &[PeakCalibration],
    output_path: &Path,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_calibration_chart(&root, element, peaks)?;
        root.present().map_err(|e| LabError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_calibration_chart(&root, element, peaks)?;
        root.present().map_err(|e| LabError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 绘制校准图表，每个峰一个子图
fn draw_calibration_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    element: &str,
    peaks: &[PeakCalibration],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    if peaks.is_empty() {
        return Ok(());
    }

    let areas = root.split_evenly((peaks.len(), 1));

    for (calib, area) in peaks.iter().zip(areas.iter()) {
        let x_min = calib.x_perc.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = calib
            .x_perc
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let (x_min, x_max) = if x_min.is_finite() && x_max > x_min {
            let pad = (x_max - x_min) * 0.05;
            (x_min - pad, x_max + pad)
        } else {
            (0.0, 1.0)
        };

        let y_max = calib
            .y_peak_area
            .iter()
            .zip(calib.y_peak_area_err.iter())
            .map(|(y, e)| y + e)
            .fold(f64::NEG_INFINITY, f64::max);
        let y_min = calib
            .y_peak_area
            .iter()
            .zip(calib.y_peak_area_err.iter())
            .map(|(y, e)| y - e)
            .fold(f64::INFINITY, f64::min);
        let (y_min, y_max) = if y_min.is_finite() && y_max > y_min {
            let pad = (y_max - y_min) * 0.1;
            (y_min - pad, y_max + pad)
        } else {
            (0.0, 1.0)
        };

        let title = format!(
            "{} peak [{}, {}] keV; r² = {:.4}",
            element, calib.peak.0, calib.peak.1, calib.r2
        );

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 20).into_font())
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| LabError::Other(format!("{:?}", e)))?;

        chart
            .configure_mesh()
            .x_desc(format!("{} amount (percent)", element))
            .y_desc(format!("{} peak area (a.u.)", element))
            .x_label_style(("sans-serif", 14))
            .y_label_style(("sans-serif", 14))
            .axis_desc_style(("sans-serif", 16))
            .draw()
            .map_err(|e| LabError::Other(format!("{:?}", e)))?;

        let point_color = RGBColor(0, 102, 204);
        let line_color = RGBColor(204, 51, 51);

        // 误差棒与数据点
        chart
            .draw_series(
                calib
                    .x_perc
                    .iter()
                    .zip(calib.y_peak_area.iter())
                    .zip(calib.y_peak_area_err.iter())
                    .map(|((&x, &y), &e)| {
                        ErrorBar::new_vertical(x, y - e, y, y + e, point_color.filled(), 6)
                    }),
            )
            .map_err(|e| LabError::Other(format!("{:?}", e)))?;

        // 拟合直线
        let fit_label = format!(
            "({:.3}±{:.3})·x + ({:.3}±{:.3})",
            calib.slope, calib.slope_err, calib.intercept, calib.intercept_err
        );
        chart
            .draw_series(LineSeries::new(
                [
                    (x_min, calib.intercept + calib.slope * x_min),
                    (x_max, calib.intercept + calib.slope * x_max),
                ],
                line_color.stroke_width(2),
            ))
            .map_err(|e| LabError::Other(format!("{:?}", e)))?
            .label(fit_label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], line_color.stroke_width(2))
            });

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .label_font(("sans-serif", 13))
            .draw()
            .map_err(|e| LabError::Other(format!("{:?}", e)))?;
    }

    Ok(())
}
