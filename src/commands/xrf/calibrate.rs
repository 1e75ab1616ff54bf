//! # xrf calibrate 子命令实现
//!
//! 由已知负载量的标样光谱建立元素校准曲线：峰面积对基体
//! 归一化后对元素含量 (percent) 做直线拟合，逐峰保存为
//! JSON 并可选绘制校准图。
//!
//! ## 依赖关系
//! - 使用 `commands/xrf/mod.rs` 的公共上下文
//! - 使用 `xrf/peaks.rs` 计算峰积分
//! - 使用 `math/linfit.rs` 拟合
//! - 使用 `xrf/calibration.rs` 保存结果

use crate::cli::xrf::{self, CalibrateArgs};
use crate::error::{LabError, Result};
use crate::math::linfit;
use crate::utils::output;
use crate::xrf::{self as xrf_core, ElementCalibration, PeakCalibration};

use super::{build_context, normalize_integrals, XrfContext};

/// 执行 calibrate 子命令
pub fn execute(args: CalibrateArgs) -> Result<()> {
    output::print_header("XRF Calibration");

    let ctx = build_context(&args.spectra)?;

    let amounts =
        xrf::parse_amount_list(&args.element_amounts).map_err(LabError::InvalidArgument)?;
    if amounts.len() != ctx.plan.num_samples() {
        return Err(LabError::InvalidArgument(format!(
            "{} element amounts given for {} sample spectra",
            amounts.len(),
            ctx.plan.num_samples()
        )));
    }
    if args.calib_weight <= 0.0 {
        return Err(LabError::InvalidArgument(
            "calibration powder weight must be positive".to_string(),
        ));
    }

    let powder_ints = xrf_core::element_integrals(
        &ctx.set,
        &ctx.powder,
        &ctx.plan,
        ctx.subtract_background,
    )?;

    let label = if args.spectra.calib_label.is_empty() {
        chrono::Local::now().format("%Y%m%d").to_string()
    } else {
        args.spectra.calib_label.clone()
    };

    let mut fit_rows = Vec::new();
    for element in &ctx.elements {
        let calibration = calibrate_element(&ctx, element, &amounts, &powder_ints, &args)?;

        let path = calibration.save(&args.spectra.calib_path, &label)?;
        output::print_success(&format!(
            "Calibration for {} saved to '{}'",
            element.symbol,
            path.display()
        ));

        if !args.no_plot {
            let plot_path = args
                .spectra
                .calib_path
                .join(format!("{}_calib_{}.png", element.symbol, label));
            xrf_core::plot::generate_calibration_plot(
                element.symbol,
                &calibration.peaks,
                &plot_path,
                args.width,
                args.height * calibration.peaks.len() as u32,
                false,
            )?;
            output::print_success(&format!("Plot saved to '{}'", plot_path.display()));
        }

        for (p, peak) in calibration.peaks.iter().enumerate() {
            fit_rows.push(FitRow {
                element: element.symbol.to_string(),
                peak: format!("{:.2} .. {:.2} keV", element.peaks[p].0, element.peaks[p].1),
                slope: format!("{:.4} ± {:.4}", peak.slope, peak.slope_err),
                intercept: format!("{:.4} ± {:.4}", peak.intercept, peak.intercept_err),
                r2: format!("{:.5}", peak.r2),
            });
        }
    }

    print_fit_table(&fit_rows);
    Ok(())
}

/// 一个元素的校准：逐峰归一化、换算含量、拟合
fn calibrate_element(
    ctx: &XrfContext,
    element: &xrf_core::ElementData,
    amounts: &[Option<f64>],
    powder_ints: &[xrf_core::SampleIntegrals],
    args: &CalibrateArgs,
) -> Result<ElementCalibration> {
    let element_ints =
        xrf_core::element_integrals(&ctx.set, element, &ctx.plan, ctx.subtract_background)?;

    // µmol → percent 换算只依赖元素摩尔质量和标样称量
    let umol_to_perc = element.molar_mass / (args.calib_weight * 10.0);

    // norms[sample] = (各峰归一化面积, 各峰误差)
    let mut norms = Vec::with_capacity(element_ints.len());
    for (ints, powder) in element_ints.iter().zip(powder_ints) {
        norms.push(normalize_integrals(
            &ints.avgs,
            &ints.stds,
            &powder.avgs,
            &powder.stds,
        )?);
    }

    let mut peaks = Vec::with_capacity(element.peaks.len());
    for (p, &peak_limits) in element.peaks.iter().enumerate() {
        let mut x_perc = Vec::new();
        let mut y_area = Vec::new();
        let mut y_err = Vec::new();
        let mut weights = Vec::new();
        for (i, amount) in amounts.iter().enumerate() {
            // 空项标记弃用的标样
            let amount = match amount {
                Some(a) => *a,
                None => continue,
            };
            let x_umol = amount / args.calib_weight * ctx.powder_weights[i];
            x_perc.push(x_umol * umol_to_perc);
            y_area.push(norms[i].0[p]);
            y_err.push(norms[i].1[p]);
            weights.push(ctx.powder_weights[i]);
        }

        let fit = if args.spectra.skip_intercept {
            linfit::fit_line_through_origin(&x_perc, &y_area)?
        } else {
            linfit::fit_line(&x_perc, &y_area)?
        };

        peaks.push(PeakCalibration {
            peak: peak_limits,
            intercept: fit.intercept,
            intercept_err: fit.intercept_err,
            slope: fit.slope,
            slope_err: fit.slope_err,
            r2: fit.r_squared(),
            x_perc,
            umol_to_perc,
            y_peak_area: y_area,
            y_peak_area_err: y_err,
            calib_weights: weights,
        });
    }

    Ok(ElementCalibration {
        element: element.symbol.to_string(),
        peaks,
    })
}

#[derive(tabled::Tabled)]
struct FitRow {
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "Peak")]
    peak: String,
    #[tabled(rename = "Slope")]
    slope: String,
    #[tabled(rename = "Intercept")]
    intercept: String,
    #[tabled(rename = "r²")]
    r2: String,
}

fn print_fit_table(rows: &[FitRow]) {
    println!("{}", tabled::Table::new(rows));
}
