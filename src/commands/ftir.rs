//! # ftir 命令实现
//!
//! 读取 FTIR 光谱 CSV，对指定波数窗口做积分（可选基线
//! 扣除与质量归一化），结果打印为表格并写出 CSV，可选
//! 绘制带窗口阴影的光谱图。
//!
//! ## 依赖关系
//! - 使用 `cli/ftir.rs` 定义的 FtirArgs
//! - 使用 `parsers/ftir_csv.rs` 解析光谱
//! - 使用 `ftir/` 的积分与绘图

use crate::cli::ftir::FtirArgs;
use crate::error::{LabError, Result};
use crate::ftir::{self, WindowIntegral};
use crate::parsers::ftir_csv;
use crate::utils::output;

use std::path::{Path, PathBuf};

/// 执行 ftir 命令
pub fn execute(args: FtirArgs) -> Result<()> {
    output::print_header("FTIR Window Integration");

    let spectrum = ftir_csv::parse_ftir(&args.input)?;
    output::print_info(&format!(
        "Read {} points from '{}'",
        spectrum.len(),
        args.input.display()
    ));

    let windows = ftir::parse_windows(&args.windows)?;
    let integrals = ftir::integrate_windows(&spectrum, &windows, args.baseline, args.mass)?;

    print_integral_table(&integrals);

    let out_path = output_path(&args);
    if out_path.exists() && !args.overwrite {
        output::print_skip(&format!(
            "Output exists, skipping: {} (use --overwrite)",
            out_path.display()
        ));
    } else {
        write_integral_csv(&out_path, &integrals)?;
        output::print_written(&args.input.display().to_string(), &out_path.display().to_string());
    }

    if args.plot {
        let plot_path = out_path.with_extension(args.format.extension());
        let title = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "FTIR".to_string());
        ftir::plot::generate_ftir_plot(
            &spectrum,
            &windows,
            &plot_path,
            &title,
            args.width,
            args.height,
            args.format.is_svg(),
        )?;
        output::print_success(&format!("Plot saved to '{}'", plot_path.display()));
    }

    Ok(())
}

/// 输出文件路径：`--output` 或 `<名>_integrals.csv`
fn output_path(args: &FtirArgs) -> PathBuf {
    if let Some(path) = &args.output {
        return path.clone();
    }
    let stem = args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "ftir".to_string());
    let dir = args
        .input
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(format!("{}_integrals.csv", stem))
}

/// 结果 CSV：每窗口一行
fn write_integral_csv(path: &Path, integrals: &[WindowIntegral]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(LabError::CsvError)?;
    writer.write_record(["window lo", "window hi", "integral", "integral per mg"])?;
    for w in integrals {
        writer.write_record([
            format!("{}", w.lo),
            format!("{}", w.hi),
            format!("{}", w.integral),
            w.normalized.map(|v| format!("{}", v)).unwrap_or_default(),
        ])?;
    }
    writer.flush().map_err(|e| LabError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// 终端积分表
fn print_integral_table(integrals: &[WindowIntegral]) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct IntegralRow {
        #[tabled(rename = "Window (cm⁻¹)")]
        window: String,
        #[tabled(rename = "Integral")]
        integral: String,
        #[tabled(rename = "Integral / mg")]
        normalized: String,
    }

    let rows: Vec<IntegralRow> = integrals
        .iter()
        .map(|w| IntegralRow {
            window: format!("{} .. {}", w.lo, w.hi),
            integral: format!("{:.4}", w.integral),
            normalized: w
                .normalized
                .map(|v| format!("{:.4}", v))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    println!("{}", Table::new(&rows));
}
