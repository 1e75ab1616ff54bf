//! # xrf 子命令 CLI 定义
//!
//! XRF 元素含量分析入口，包含多个子命令：
//! - `calibrate`: 由已知含量标样建立校准曲线
//! - `analyze`: 应用校准计算未知样品含量
//! - `list-calibs`: 列出可用校准文件
//!
//! 逗号分隔列表参数（元素、支架、含量、质量、标签）
//! 的解析函数也在此模块中。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/xrf/` 相应模块

use clap::{Args, Subcommand};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Xrf 主命令
// ─────────────────────────────────────────────────────────────

/// xrf 主命令参数
#[derive(Args, Debug)]
pub struct XrfArgs {
    #[command(subcommand)]
    pub command: XrfCommands,
}

/// xrf 子命令
#[derive(Subcommand, Debug)]
pub enum XrfCommands {
    /// Build element calibration curves from spectra of known standards
    Calibrate(CalibrateArgs),

    /// Apply saved calibrations to quantify element content
    Analyze(AnalyzeArgs),

    /// List available calibration files
    ListCalibs(ListCalibsArgs),
}

// ─────────────────────────────────────────────────────────────
// 共享的光谱文件参数
// ─────────────────────────────────────────────────────────────

/// 光谱 CSV 读取与测量排布参数，calibrate 和 analyze 共用
#[derive(Args, Debug)]
pub struct SpectraArgs {
    /// Path to the spectra CSV file exported by the instrument
    pub spectra: PathBuf,

    /// Number of measurement repeats for each sample
    #[arg(short, long, default_value_t = 3)]
    pub repeats: usize,

    /// Do not skip the first spectrum (instrument self-calibration)
    #[arg(long, default_value_t = false)]
    pub keep_first: bool,

    /// Comma separated elements to analyze (e.g. "Au" or "Au,Ag")
    #[arg(short, long, default_value = "Au")]
    pub elements: String,

    /// Matrix (powder) element used for normalization
    #[arg(short, long, default_value = "Si")]
    pub powder_element: String,

    /// Comma separated one-based holder IDs; looped over samples when
    /// fewer IDs than spectra are given; empty disables background
    /// subtraction
    #[arg(long, default_value = "1,2")]
    pub holders: String,

    /// Skip background subtraction even when holders are given
    #[arg(long, default_value_t = false)]
    pub skip_background: bool,

    /// Comma separated powder weights in mg, looped when fewer values
    /// than samples are given
    #[arg(long, default_value = "250")]
    pub powder_weights: String,

    /// Comma separated sample labels; missing labels are generated
    #[arg(long, default_value = "")]
    pub labels: String,

    /// Directory with calibration JSON files
    #[arg(long, default_value = "./calibs")]
    pub calib_path: PathBuf,

    /// Calibration label; empty means today's date (YYYYMMDD) when
    /// calibrating and any matching label when analyzing
    #[arg(long, default_value = "")]
    pub calib_label: String,

    /// Treat the calibration intercept as zero
    #[arg(long, default_value_t = false)]
    pub skip_intercept: bool,
}

// ─────────────────────────────────────────────────────────────
// calibrate 子命令
// ─────────────────────────────────────────────────────────────

/// calibrate 子命令参数
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    #[command(flatten)]
    pub spectra: SpectraArgs,

    /// Comma separated element amounts (µmol) deposited on the standards;
    /// empty entries skip a spectrum
    #[arg(long, default_value = "0,0.5,1,3,5,10,15,,20,25")]
    pub element_amounts: String,

    /// Mass (mg) of powder used to prepare the calibration standards
    #[arg(long, default_value_t = 250.0)]
    pub calib_weight: f64,

    /// Skip the calibration curve plot
    #[arg(long, default_value_t = false)]
    pub no_plot: bool,

    /// Figure width in pixels
    #[arg(long, default_value_t = 1000)]
    pub width: u32,

    /// Figure height in pixels per peak panel
    #[arg(long, default_value_t = 500)]
    pub height: u32,
}

// ─────────────────────────────────────────────────────────────
// analyze 子命令
// ─────────────────────────────────────────────────────────────

/// analyze 子命令参数
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub spectra: SpectraArgs,

    /// Directory for the result CSV (default: next to the spectra file)
    #[arg(long)]
    pub results_path: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// list-calibs 子命令
// ─────────────────────────────────────────────────────────────

/// list-calibs 子命令参数
#[derive(Args, Debug)]
pub struct ListCalibsArgs {
    /// Directory with calibration JSON files
    #[arg(long, default_value = "./calibs")]
    pub calib_path: PathBuf,
}

// ─────────────────────────────────────────────────────────────
// 列表参数解析
// ─────────────────────────────────────────────────────────────

/// 解析逗号分隔的字符串列表，空白被修剪，空串给出空列表
pub fn parse_str_list(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    input.split(',').map(|s| s.trim().to_string()).collect()
}

/// 解析逗号分隔的数值列表
pub fn parse_f64_list(input: &str) -> Result<Vec<f64>, String> {
    let mut values = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let v: f64 = part
            .parse()
            .map_err(|_| format!("Invalid number '{}' in list '{}'", part, input))?;
        values.push(v);
    }
    Ok(values)
}

/// 解析逗号分隔的支架编号列表（1 基）
pub fn parse_holder_list(input: &str) -> Result<Vec<usize>, String> {
    let mut ids = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id: usize = part
            .parse()
            .map_err(|_| format!("Invalid holder ID '{}' in list '{}'", part, input))?;
        ids.push(id);
    }
    Ok(ids)
}

/// 解析标样含量列表；空项表示跳过对应光谱，给出 None
pub fn parse_amount_list(input: &str) -> Result<Vec<Option<f64>>, String> {
    let mut amounts = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            amounts.push(None);
            continue;
        }
        let v: f64 = part
            .parse()
            .map_err(|_| format!("Invalid amount '{}' in list '{}'", part, input))?;
        amounts.push(Some(v));
    }
    Ok(amounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_list() {
        assert_eq!(parse_str_list("Au, Ag"), vec!["Au", "Ag"]);
        assert!(parse_str_list("").is_empty());
        assert!(parse_str_list("  ").is_empty());
    }

    #[test]
    fn test_parse_f64_list() {
        assert_eq!(
            parse_f64_list("250, 168.8").unwrap(),
            vec![250.0, 168.8]
        );
        assert!(parse_f64_list("1,abc").is_err());
    }

    #[test]
    fn test_parse_holder_list() {
        assert_eq!(parse_holder_list("1,2,1").unwrap(), vec![1, 2, 1]);
        assert!(parse_holder_list("").unwrap().is_empty());
        assert!(parse_holder_list("x").is_err());
    }

    #[test]
    fn test_parse_amount_list_with_blanks() {
        let amounts = parse_amount_list("0,0.5,,25").unwrap();
        assert_eq!(
            amounts,
            vec![Some(0.0), Some(0.5), None, Some(25.0)]
        );
        assert!(parse_amount_list("1,zz").is_err());
    }
}
