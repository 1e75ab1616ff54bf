//! # adsorption parse 子命令实现
//!
//! 解析 Tristar 文本报告，提取汇总值、等温线和 BJH 数据表，
//! 写出每个样品一份 CSV；目录模式额外写出全体样品的
//! `summary.csv`。
//!
//! ## 依赖关系
//! - 使用 `cli/adsorption.rs` 定义的 ParseArgs
//! - 使用 `parsers/tristar.rs` 解析报告
//! - 使用 `report.rs` 写出 CSV
//! - 使用 `batch/` 模块进行批量处理

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::adsorption::ParseArgs;
use crate::error::{LabError, Result};
use crate::parsers::tristar::{self, TristarReport};
use crate::report::{self, ReportColumn};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 执行 parse 子命令
pub fn execute(args: ParseArgs) -> Result<()> {
    output::print_header("Tristar Report Parsing");

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

/// 单文件模式
fn execute_single_file(args: &ParseArgs) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let out_path = output_path(&args.input, args.output_dir.as_deref())?;
    if out_path.exists() && !args.overwrite {
        output::print_skip(&format!(
            "Output exists, skipping: {} (use --overwrite)",
            out_path.display()
        ));
        return Ok(());
    }

    let report = tristar::parse_report(&args.input)?;

    // 单文件模式下对缺失的条目逐一告警
    for value in report.summary() {
        if value.value.is_none() {
            output::print_warning(&format!("Summary value not found: {}", value.name));
        }
    }
    for table in report.bjh_tables() {
        if table.points.is_empty() {
            output::print_warning(&format!("Table not found: {}", table.title));
        }
    }

    write_report_csv(&report, &out_path)?;
    output::print_written(&args.input.display().to_string(), &out_path.display().to_string());
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &ParseArgs) -> Result<()> {
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

    let output_dir = args.output_dir.clone();
    let overwrite = args.overwrite;

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files.clone(), |file| {
        process_batch_file(file, output_dir.as_deref(), overwrite)
    })?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));
    for (path, err) in result.failures.iter().take(10) {
        output::print_error(&format!("  {}: {}", path, err));
    }

    // 汇总全体样品的 summary.csv
    write_batch_summary(&files, &args.input, args.output_dir.as_deref())?;
    Ok(())
}

/// 批量模式中处理单个文件
fn process_batch_file(
    input: &PathBuf,
    output_dir: Option<&Path>,
    overwrite: bool,
) -> ProcessResult {
    let out_path = match output_path(input, output_dir) {
        Ok(p) => p,
        Err(e) => return ProcessResult::Failed(input.display().to_string(), e.to_string()),
    };
    if out_path.exists() && !overwrite {
        return ProcessResult::Skipped(format!("Output exists: {}", out_path.display()));
    }

    let report = match tristar::parse_report(input) {
        Ok(r) => r,
        Err(e) => return ProcessResult::Failed(input.display().to_string(), e.to_string()),
    };

    match write_report_csv(&report, &out_path) {
        Ok(_) => ProcessResult::Success(format!(
            "{} -> {}",
            input.display(),
            out_path.display()
        )),
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

/// 输出文件路径：`<stem>.csv`，默认与输入同目录
fn output_path(input: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let stem = tristar::sample_name(input);
    let dir = match output_dir {
        Some(d) => d.to_path_buf(),
        None => input
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    Ok(dir.join(format!("{}.csv", stem)))
}

/// 写出单个报告的列式 CSV
fn write_report_csv(report: &TristarReport, out_path: &Path) -> Result<()> {
    let mut columns: Vec<ReportColumn> = Vec::new();

    // 汇总值，每个一列
    for value in report.summary() {
        columns.push(ReportColumn::new(
            &value.name,
            &value.unit,
            &report.sample,
            value.value.into_iter().collect(),
        ));
    }

    // 等温线：两支与拼合后的整条
    let isotherm = report.isotherm();
    let pairs: &[(&str, &[(f64, f64)])] = &[
        ("Adsorption", &isotherm.adsorption),
        ("Desorption", &isotherm.desorption),
    ];
    for (branch, points) in pairs {
        columns.push(ReportColumn::new(
            &format!("{} Relative Pressure", branch),
            "p/p°",
            &report.sample,
            points.iter().map(|(p, _)| *p).collect(),
        ));
        columns.push(ReportColumn::new(
            &format!("{} Quantity Adsorbed", branch),
            "cm³/g",
            &report.sample,
            points.iter().map(|(_, q)| *q).collect(),
        ));
    }

    // BJH 数据表，每张两列
    for table in report.bjh_tables() {
        columns.push(ReportColumn::new(
            &format!("{} {}", table.title, table.x_name),
            &table.x_unit,
            &report.sample,
            table.points.iter().map(|(x, _)| *x).collect(),
        ));
        columns.push(ReportColumn::new(
            &table.title,
            &table.y_unit,
            &report.sample,
            table.points.iter().map(|(_, y)| *y).collect(),
        ));
    }

    report::write_columns_to_file(out_path, &columns)
}

/// 目录模式的 summary.csv：每个样品一行汇总值
fn write_batch_summary(
    files: &[PathBuf],
    input_dir: &Path,
    output_dir: Option<&Path>,
) -> Result<()> {
    let mut titles: Vec<String> = Vec::new();
    let mut units: Vec<String> = Vec::new();
    let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();

    for file in files {
        let report = match tristar::parse_report(file) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let summary = report.summary();
        if titles.is_empty() {
            titles = summary.iter().map(|v| v.name.clone()).collect();
            units = summary.iter().map(|v| v.unit.clone()).collect();
        }
        rows.push((
            report.sample.clone(),
            summary.iter().map(|v| v.value).collect(),
        ));
    }

    if rows.is_empty() {
        output::print_warning("No parsable reports, summary.csv not written");
        return Ok(());
    }

    let dir = output_dir.unwrap_or(input_dir);
    let path = dir.join("summary.csv");
    report::write_summary_to_file(&path, &titles, &units, &rows)?;
    output::print_success(&format!("Summary saved to '{}'", path.display()));
    Ok(())
}
