//! # xrf analyze 子命令实现
//!
//! 应用保存的校准曲线计算未知样品中的元素含量。每个峰
//! 独立给出含量及误差，再对峰取平均；结果以
//! `Result_<光谱文件名>.csv` 写出，列为样品标签。
//!
//! ## 依赖关系
//! - 使用 `commands/xrf/mod.rs` 的公共上下文
//! - 使用 `xrf/calibration.rs` 读取校准
//! - 使用 `csv` crate 写结果表

use crate::cli::xrf::AnalyzeArgs;
use crate::error::{LabError, Result};
use crate::utils::output;
use crate::xrf::{self as xrf_core, calibration, ElementCalibration};

use std::path::PathBuf;

use super::{build_context, normalize_integrals, XrfContext};

/// 执行 analyze 子命令
pub fn execute(args: AnalyzeArgs) -> Result<()> {
    output::print_header("XRF Content Analysis");

    let ctx = build_context(&args.spectra)?;

    let powder_ints = xrf_core::element_integrals(
        &ctx.set,
        &ctx.powder,
        &ctx.plan,
        ctx.subtract_background,
    )?;

    let mut results = Vec::new();
    for element in &ctx.elements {
        let calib_path = calibration::find_calibration_file(
            &args.spectra.calib_path,
            element.symbol,
            &args.spectra.calib_label,
        )?;
        output::print_info(&format!(
            "Using calibration '{}' for {}",
            calib_path.display(),
            element.symbol
        ));
        let calib = ElementCalibration::load(&calib_path, element.symbol)?;
        if calib.peaks.len() != element.peaks.len() {
            return Err(LabError::InvalidArgument(format!(
                "calibration for {} has {} peaks but element data has {}",
                element.symbol,
                calib.peaks.len(),
                element.peaks.len()
            )));
        }

        results.push(analyze_element(
            &ctx,
            element,
            &calib,
            &powder_ints,
            args.spectra.skip_intercept,
        )?);
    }

    print_result_table(&ctx, &results);
    let out_path = write_result_csv(&args, &ctx, &results)?;
    output::print_success(&format!("Results saved to '{}'", out_path.display()));
    Ok(())
}

/// 一个元素在所有样品上的含量
struct ElementResult {
    element: String,
    /// 每个样品的 (perc, perc_err, umol, umol_err)
    samples: Vec<(f64, f64, f64, f64)>,
}

/// 应用校准：逐峰求含量再平均
fn analyze_element(
    ctx: &XrfContext,
    element: &xrf_core::ElementData,
    calib: &ElementCalibration,
    powder_ints: &[xrf_core::SampleIntegrals],
    skip_intercept: bool,
) -> Result<ElementResult> {
    let element_ints =
        xrf_core::element_integrals(&ctx.set, element, &ctx.plan, ctx.subtract_background)?;

    let mut samples = Vec::with_capacity(element_ints.len());
    for (i, (ints, powder)) in element_ints.iter().zip(powder_ints).enumerate() {
        let (norms, errs) = normalize_integrals(&ints.avgs, &ints.stds, &powder.avgs, &powder.stds)?;

        let mut perc_sum = 0.0;
        let mut err_sq_sum = 0.0;
        for (p, peak) in calib.peaks.iter().enumerate() {
            if peak.slope.abs() < 1e-300 {
                return Err(LabError::FitError(format!(
                    "calibration slope for {} peak {} is zero",
                    element.symbol, p
                )));
            }
            let intercept = if skip_intercept { 0.0 } else { peak.intercept };
            let perc = (norms[p] - intercept) / peak.slope;
            // 归一化面积、截距和斜率的误差按方和根传播
            let a = errs[p] / peak.slope;
            let b = peak.intercept_err / peak.slope;
            let c = (norms[p] - intercept) / (peak.slope * peak.slope) * peak.slope_err;
            let err = (a * a + b * b + c * c).sqrt();

            perc_sum += perc;
            err_sq_sum += err * err;
        }
        let n = calib.peaks.len() as f64;
        let perc = perc_sum / n;
        let perc_err = err_sq_sum.sqrt() / n;

        let umol_factor = ctx.powder_weights[i] * 10.0 / element.molar_mass;
        samples.push((perc, perc_err, perc * umol_factor, perc_err * umol_factor));
    }

    Ok(ElementResult {
        element: element.symbol.to_string(),
        samples,
    })
}

/// 结果 CSV：`Result_<光谱文件名>.csv`，行是元素指标，列是样品
fn write_result_csv(
    args: &AnalyzeArgs,
    ctx: &XrfContext,
    results: &[ElementResult],
) -> Result<PathBuf> {
    let stem = args
        .spectra
        .spectra
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "spectra".to_string());
    let dir = match &args.results_path {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| LabError::FileWriteError {
                path: dir.display().to_string(),
                source: e,
            })?;
            dir.clone()
        }
        None => args
            .spectra
            .spectra
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let path = dir.join(format!("Result_{}.csv", stem));

    let mut writer = csv::Writer::from_path(&path).map_err(LabError::CsvError)?;

    let mut header = vec!["Element".to_string()];
    header.extend(ctx.labels.iter().cloned());
    writer.write_record(&header)?;

    for result in results {
        let rows: [(&str, fn(&(f64, f64, f64, f64)) -> f64); 4] = [
            ("perc", |s| s.0),
            ("perc err", |s| s.1),
            ("umol", |s| s.2),
            ("umol err", |s| s.3),
        ];
        for (suffix, pick) in rows {
            let mut record = vec![format!("{} {}", result.element, suffix)];
            record.extend(result.samples.iter().map(|s| format!("{}", pick(s))));
            writer.write_record(&record)?;
        }
    }

    writer.flush().map_err(|e| LabError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path)
}

/// 终端结果表
fn print_result_table(ctx: &XrfContext, results: &[ElementResult]) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct ContentRow {
        #[tabled(rename = "Sample")]
        sample: String,
        #[tabled(rename = "Element")]
        element: String,
        #[tabled(rename = "Content (%)")]
        perc: String,
        #[tabled(rename = "Content (µmol)")]
        umol: String,
    }

    let mut rows = Vec::new();
    for result in results {
        for (i, (perc, perc_err, umol, umol_err)) in result.samples.iter().enumerate() {
            rows.push(ContentRow {
                sample: ctx.labels[i].clone(),
                element: result.element.clone(),
                perc: format!("{:.4} ± {:.4}", perc, perc_err),
                umol: format!("{:.3} ± {:.3}", umol, umol_err),
            });
        }
    }
    println!("{}", Table::new(&rows));
}
