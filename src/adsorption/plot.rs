//! # 吸附数据图表生成
//!
//! 使用 `plotters` 库生成等温线与孔径分布图。
//!
//! ## 功能
//! - 等温线图（吸附/脱附两支不同颜色）
//! - 孔径分布图（对数孔宽坐标）
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/adsorption/calc.rs` 调用
//! - 使用 `models/isotherm.rs` 的 Isotherm 结构
//! - 使用 `adsorption/bjh.rs` 的 BjhResult 结构
//! - 使用 `plotters` 渲染图表

use crate::adsorption::BjhResult;
use crate::error::{LabError, Result};
use crate::models::Isotherm;

use plotters::prelude::*;
use std::path::Path;

/// 生成等温线图
pub fn generate_isotherm_plot(
    isotherm: &Isotherm,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_isotherm_chart(&root, isotherm, title)?;
        root.present().map_err(|e| LabError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_isotherm_chart(&root, isotherm, title)?;
        root.present().map_err(|e| LabError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 生成孔径分布图 (dV/dlog(w) 对孔宽，对数横轴)
pub fn generate_pore_distribution_plot(
    bjh: &BjhResult,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_distribution_chart(&root, bjh, title)?;
        root.present().map_err(|e| LabError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_distribution_chart(&root, bjh, title)?;
        root.present().map_err(|e| LabError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 绘制等温线图表
fn draw_isotherm_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    isotherm: &Isotherm,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    let q_max = isotherm
        .adsorption
        .iter()
        .chain(isotherm.desorption.iter())
        .map(|(_, q)| *q)
        .fold(f64::NEG_INFINITY, f64::max);
    let q_max = if q_max.is_finite() { q_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..q_max)
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Relative Pressure (p/p°)")
        .y_desc("Quantity Adsorbed (cm³/g STP)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    let ads_color = RGBColor(0, 102, 204);
    let des_color = RGBColor(204, 51, 51);

    chart
        .draw_series(LineSeries::new(
            isotherm.adsorption.iter().copied(),
            ads_color.stroke_width(2),
        ))
        .map_err(|e| LabError::Other(format!("{:?}", e)))?
        .label("Adsorption")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 18, y)], ads_color.stroke_width(2))
        });

    chart
        .draw_series(
            isotherm
                .adsorption
                .iter()
                .map(|&(p, q)| Circle::new((p, q), 3, ads_color.filled())),
        )
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    chart
        .draw_series(LineSeries::new(
            isotherm.desorption.iter().copied(),
            des_color.stroke_width(2),
        ))
        .map_err(|e| LabError::Other(format!("{:?}", e)))?
        .label("Desorption")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 18, y)], des_color.stroke_width(2))
        });

    chart
        .draw_series(
            isotherm
                .desorption
                .iter()
                .map(|&(p, q)| Circle::new((p, q), 3, des_color.filled())),
        )
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    Ok(())
}

/// 绘制孔径分布图表
fn draw_distribution_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    bjh: &BjhResult,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    // 仅绘制正孔宽区间，避免对数坐标越界
    let data: Vec<(f64, f64)> = bjh
        .widths
        .iter()
        .zip(bjh.dv_dlogw.iter())
        .filter(|(w, _)| **w > 0.0)
        .map(|(w, v)| (*w, *v))
        .collect();

    let (x_min, x_max) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (w, _)| {
            (lo.min(*w), hi.max(*w))
        });
    let (x_min, x_max) = if x_min.is_finite() && x_max > x_min {
        (x_min, x_max)
    } else {
        (1.0, 100.0)
    };
    let y_max = data
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    let y_max = if y_max.is_finite() && y_max > 0.0 {
        y_max * 1.1
    } else {
        1.0
    };

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((x_min..x_max).log_scale(), 0.0..y_max)
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Pore Width (nm)")
        .y_desc("dV/dlog(w) (cm³/g)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    let line_color = RGBColor(0, 102, 204);

    chart
        .draw_series(LineSeries::new(data.iter().copied(), line_color.stroke_width(2)))
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    chart
        .draw_series(
            data.iter()
                .map(|&(w, v)| Circle::new((w, v), 3, line_color.filled())),
        )
        .map_err(|e| LabError::Other(format!("{:?}", e)))?;

    Ok(())
}
