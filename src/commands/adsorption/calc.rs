//! # adsorption calc 子命令实现
//!
//! 从 Tristar 报告的等温线出发计算 BET 比表面积和
//! BJH 孔径分布（吸附/脱附两支），写出每个样品的
//! `<名>_calc.csv`，可选等温线与孔径分布图；目录模式
//! 额外写出 `summary_calc.csv`。
//!
//! ## 依赖关系
//! - 使用 `cli/adsorption.rs` 定义的 CalcArgs
//! - 使用 `parsers/tristar.rs` 解析等温线
//! - 使用 `adsorption/` 的 BET / BJH 计算与绘图
//! - 使用 `report.rs` 写出 CSV
//! - 使用 `batch/` 模块进行批量处理

use crate::adsorption::{self, BetResult, BjhResult, BjhSummary};
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::adsorption::CalcArgs;
use crate::error::{LabError, Result};
use crate::models::Isotherm;
use crate::parsers::tristar;
use crate::report::{self, ReportColumn};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 执行 calc 子命令
pub fn execute(args: CalcArgs) -> Result<()> {
    output::print_header("BET / BJH Calculation");

    if args.input.is_file() {
        execute_single_file(&args)
    } else if args.input.is_dir() {
        execute_batch(&args)
    } else {
        Err(LabError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 一个样品的完整计算结果
struct CalcOutcome {
    sample: String,
    isotherm: Isotherm,
    bet: BetResult,
    bjh_des: BjhResult,
    bjh_ads: BjhResult,
}

/// 单文件模式
fn execute_single_file(args: &CalcArgs) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let out_path = output_path(&args.input, args.output_dir.as_deref());
    if out_path.exists() && !args.overwrite {
        output::print_skip(&format!(
            "Output exists, skipping: {} (use --overwrite)",
            out_path.display()
        ));
        return Ok(());
    }

    let outcome = calc_file(&args.input, args.pore_min, args.pore_max)?;

    output::print_success(&format!(
        "Isotherm: {} adsorption + {} desorption points",
        outcome.isotherm.adsorption.len(),
        outcome.isotherm.desorption.len()
    ));

    print_result_table(&outcome);
    write_calc_csv(&outcome, &out_path)?;
    output::print_written(&args.input.display().to_string(), &out_path.display().to_string());

    if args.plot {
        generate_plots(&outcome, &out_path, args)?;
    }
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &CalcArgs) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(&args.input)?
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()?;

    output::print_info(&format!("Found {} report files", files.len()));

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).map_err(|e| LabError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }

    let config = Arc::new(BatchCalcConfig {
        output_dir: args.output_dir.clone(),
        pore_min: args.pore_min,
        pore_max: args.pore_max,
        plot: args.plot,
        args: args.clone_plot_options(),
        overwrite: args.overwrite,
    });

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files.clone(), |file| process_batch_file(file, &config))?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));
    for (path, err) in result.failures.iter().take(10) {
        output::print_error(&format!("  {}: {}", path, err));
    }

    write_batch_summary(&files, args)?;
    Ok(())
}

/// 批量模式共享配置
struct BatchCalcConfig {
    output_dir: Option<PathBuf>,
    pore_min: f64,
    pore_max: f64,
    plot: bool,
    args: PlotOptions,
    overwrite: bool,
}

/// 绘图参数子集，批量模式跨线程共享
#[derive(Clone)]
pub struct PlotOptions {
    pub svg: bool,
    pub extension: &'static str,
    pub width: u32,
    pub height: u32,
}

impl CalcArgs {
    fn clone_plot_options(&self) -> PlotOptions {
        PlotOptions {
            svg: self.format.is_svg(),
            extension: self.format.extension(),
            width: self.width,
            height: self.height,
        }
    }
}

/// 批量模式中处理单个文件
fn process_batch_file(input: &PathBuf, config: &Arc<BatchCalcConfig>) -> ProcessResult {
    let out_path = output_path(input, config.output_dir.as_deref());
    if out_path.exists() && !config.overwrite {
        return ProcessResult::Skipped(format!("Output exists: {}", out_path.display()));
    }

    let outcome = match calc_file(input, config.pore_min, config.pore_max) {
        Ok(o) => o,
        Err(e) => return ProcessResult::Failed(input.display().to_string(), e.to_string()),
    };

    if let Err(e) = write_calc_csv(&outcome, &out_path) {
        return ProcessResult::Failed(input.display().to_string(), e.to_string());
    }

    if config.plot {
        if let Err(e) = generate_plots_with_options(&outcome, &out_path, &config.args) {
            return ProcessResult::Failed(input.display().to_string(), e.to_string());
        }
    }

    ProcessResult::Success(format!("{} -> {}", input.display(), out_path.display()))
}

/// 解析并计算一个报告
fn calc_file(input: &Path, pore_min: f64, pore_max: f64) -> Result<CalcOutcome> {
    let report = tristar::parse_report(input)?;
    let isotherm = report.isotherm();

    if isotherm.is_empty() {
        return Err(LabError::TableNotFound {
            table: "isotherm (Adsorption/Desorption)".to_string(),
        });
    }

    let bet = adsorption::calc_bet(
        &isotherm.adsorption,
        adsorption::bet::BET_PRESSURE_MIN,
        adsorption::bet::BET_PRESSURE_MAX,
    )?;
    let bjh_des = adsorption::calc_bjh(&isotherm.desorption, pore_min, pore_max)?;
    let bjh_ads = adsorption::calc_bjh(&isotherm.adsorption, pore_min, pore_max)?;

    Ok(CalcOutcome {
        sample: report.sample.clone(),
        isotherm,
        bet,
        bjh_des,
        bjh_ads,
    })
}

/// 汇总值列（一个分支）
fn summary_columns(branch: &str, bjh: &BjhResult, sample: &str) -> Vec<ReportColumn> {
    let entries: &[(&str, &str, f64)] = &[
        ("BJH Pore Volume User", "cm³/g", bjh.window.total_volume),
        ("BJH Pore Volume", "cm³/g", bjh.full.total_volume),
        ("BJH Pore Area User", "m²/g", bjh.window.total_area),
        ("BJH Pore Area", "m²/g", bjh.full.total_area),
        ("Mode Pore Width User", "nm", bjh.window.mode_width),
        ("Mode Pore Width", "nm", bjh.full.mode_width),
        ("Average Pore Width User", "nm", bjh.window.average_width),
        ("Average Pore Width", "nm", bjh.full.average_width),
    ];
    entries
        .iter()
        .map(|(title, unit, value)| {
            ReportColumn::new(&format!("{} {}", branch, title), unit, sample, vec![*value])
        })
        .collect()
}

/// 分布数据列（一个分支）
fn graph_columns(branch: &str, bjh: &BjhResult, sample: &str) -> Vec<ReportColumn> {
    let series: &[(&str, &str, &Vec<f64>)] = &[
        ("Pore Width", "nm", &bjh.widths),
        ("dV/dw Pore Volume", "cm³/(nm·g)", &bjh.dv_dw),
        ("dV/dlog(w) Pore Volume", "cm³/g", &bjh.dv_dlogw),
        ("Cumulative Pore Volume", "cm³/g", &bjh.v),
        ("dA/dw Pore Area", "m²/(nm·g)", &bjh.da_dw),
        ("dA/dlog(w) Pore Area", "m²/g", &bjh.da_dlogw),
        ("Cumulative Pore Area", "m²/g", &bjh.a),
    ];
    series
        .iter()
        .map(|(title, unit, values)| {
            ReportColumn::new(
                &format!("{} {}", branch, title),
                unit,
                sample,
                (*values).clone(),
            )
        })
        .collect()
}

/// 写出 `<名>_calc.csv`
fn write_calc_csv(outcome: &CalcOutcome, out_path: &Path) -> Result<()> {
    let sample = &outcome.sample;
    let mut columns: Vec<ReportColumn> = vec![
        ReportColumn::new(
            "BET surface area",
            "m²/g",
            sample,
            vec![outcome.bet.surface_area],
        ),
        ReportColumn::new(
            "BET surface area error",
            "m²/g",
            sample,
            vec![outcome.bet.surface_area_err],
        ),
        ReportColumn::new("BET fit r-value", "", sample, vec![outcome.bet.r_value]),
    ];

    columns.extend(summary_columns("Desorption", &outcome.bjh_des, sample));
    columns.extend(summary_columns("Adsorption", &outcome.bjh_ads, sample));

    // 整条等温线
    let combined = outcome.isotherm.combined();
    columns.push(ReportColumn::new(
        "Relative Pressure",
        "p/p°",
        sample,
        combined.iter().map(|(p, _)| *p).collect(),
    ));
    columns.push(ReportColumn::new(
        "Quantity Adsorbed",
        "cm³/g",
        sample,
        combined.iter().map(|(_, q)| *q).collect(),
    ));

    columns.extend(graph_columns("Desorption", &outcome.bjh_des, sample));
    columns.extend(graph_columns("Adsorption", &outcome.bjh_ads, sample));

    report::write_columns_to_file(out_path, &columns)
}

/// 输出文件路径：`<stem>_calc.csv`
fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = tristar::sample_name(input);
    let dir = match output_dir {
        Some(d) => d.to_path_buf(),
        None => input
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    dir.join(format!("{}_calc.csv", stem))
}

/// 生成等温线与孔径分布图（单文件模式）
fn generate_plots(outcome: &CalcOutcome, out_path: &Path, args: &CalcArgs) -> Result<()> {
    generate_plots_with_options(outcome, out_path, &args.clone_plot_options())
}

fn generate_plots_with_options(
    outcome: &CalcOutcome,
    out_path: &Path,
    options: &PlotOptions,
) -> Result<()> {
    let base = out_path.with_extension("");
    let base = base.to_string_lossy();

    let iso_path = PathBuf::from(format!("{}_isotherm.{}", base, options.extension));
    adsorption::plot::generate_isotherm_plot(
        &outcome.isotherm,
        &iso_path,
        &format!("{} isotherm", outcome.sample),
        options.width,
        options.height,
        options.svg,
    )?;

    let psd_path = PathBuf::from(format!("{}_pores.{}", base, options.extension));
    adsorption::plot::generate_pore_distribution_plot(
        &outcome.bjh_des,
        &psd_path,
        &format!("{} BJH desorption", outcome.sample),
        options.width,
        options.height,
        options.svg,
    )?;

    Ok(())
}

/// 单文件模式的终端结果表
fn print_result_table(outcome: &CalcOutcome) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct ResultRow {
        #[tabled(rename = "Quantity")]
        name: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Unit")]
        unit: String,
    }

    fn summary_rows(branch: &str, s: &BjhSummary) -> Vec<ResultRow> {
        vec![
            ResultRow {
                name: format!("{} BJH pore volume (user window)", branch),
                value: format!("{:.4}", s.total_volume),
                unit: "cm³/g".to_string(),
            },
            ResultRow {
                name: format!("{} BJH pore area (user window)", branch),
                value: format!("{:.2}", s.total_area),
                unit: "m²/g".to_string(),
            },
            ResultRow {
                name: format!("{} mode pore width (user window)", branch),
                value: format!("{:.2}", s.mode_width),
                unit: "nm".to_string(),
            },
            ResultRow {
                name: format!("{} average pore width (user window)", branch),
                value: format!("{:.2}", s.average_width),
                unit: "nm".to_string(),
            },
        ]
    }

    let mut rows = vec![
        ResultRow {
            name: "BET surface area".to_string(),
            value: format!(
                "{:.2} ± {:.2}",
                outcome.bet.surface_area, outcome.bet.surface_area_err
            ),
            unit: "m²/g".to_string(),
        },
        ResultRow {
            name: "BET fit r-value".to_string(),
            value: format!("{:.5}", outcome.bet.r_value),
            unit: String::new(),
        },
    ];
    rows.extend(summary_rows("Desorption", &outcome.bjh_des.window));
    rows.extend(summary_rows("Adsorption", &outcome.bjh_ads.window));

    println!("{}", Table::new(&rows));
}

/// 目录模式的 summary_calc.csv
fn write_batch_summary(files: &[PathBuf], args: &CalcArgs) -> Result<()> {
    let titles: Vec<String> = [
        "BET surface area",
        "BET surface area error",
        "BET fit r-value",
        "BJH Pore Volume User",
        "BJH Pore Volume",
        "BJH Pore Area User",
        "Mode Pore Width User",
        "Average Pore Width User",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let units: Vec<String> = ["m²/g", "m²/g", "", "cm³/g", "cm³/g", "m²/g", "nm", "nm"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for file in files {
        let outcome = match calc_file(file, args.pore_min, args.pore_max) {
            Ok(o) => o,
            Err(_) => continue,
        };
        // 汇总表沿用脱附支的 BJH 结果
        let des = &outcome.bjh_des;
        rows.push((
            outcome.sample.clone(),
            vec![
                Some(outcome.bet.surface_area),
                Some(outcome.bet.surface_area_err),
                Some(outcome.bet.r_value),
                Some(des.window.total_volume),
                Some(des.full.total_volume),
                Some(des.window.total_area),
                Some(des.window.mode_width),
                Some(des.window.average_width),
            ],
        ));
    }

    if rows.is_empty() {
        output::print_warning("No calculable reports, summary_calc.csv not written");
        return Ok(());
    }

    let dir = args.output_dir.as_deref().unwrap_or(args.input.as_path());
    let path = dir.join("summary_calc.csv");
    report::write_summary_to_file(&path, &titles, &units, &rows)?;
    output::print_success(&format!("Summary saved to '{}'", path.display()));
    Ok(())
}
