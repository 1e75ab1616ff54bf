//! # adsorption 子命令 CLI 定义
//!
//! 气体吸附分析统一入口，包含多个子命令：
//! - `parse`: 从 Tristar 报告提取汇总值和数据表
//! - `calc`: 从等温线计算 BET 比表面积和 BJH 孔径分布
//! - `encode`: 旧版 ANSI 报告转 UTF-16-LE
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/adsorption/` 相应模块

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Adsorption 主命令
// ─────────────────────────────────────────────────────────────

/// adsorption 主命令参数
#[derive(Args, Debug)]
pub struct AdsorptionArgs {
    #[command(subcommand)]
    pub command: AdsorptionCommands,
}

/// adsorption 子命令
#[derive(Subcommand, Debug)]
pub enum AdsorptionCommands {
    /// Extract summary values and report tables into CSV
    Parse(ParseArgs),

    /// Compute BET surface area and BJH pore size distribution
    Calc(CalcArgs),

    /// Re-encode legacy ANSI Tristar exports to UTF-16-LE in place
    Encode(EncodeArgs),
}

/// 图像输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum PlotFormat {
    /// PNG image
    #[default]
    Png,
    /// SVG vector image
    Svg,
}

impl PlotFormat {
    pub fn is_svg(&self) -> bool {
        matches!(self, PlotFormat::Svg)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

// ─────────────────────────────────────────────────────────────
// parse 子命令
// ─────────────────────────────────────────────────────────────

/// parse 子命令参数
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Input: Tristar report file or directory with reports
    pub input: PathBuf,

    /// Output directory (default: next to input files)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Glob pattern for input files (batch mode)
    #[arg(long, default_value = "*.txt")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

// ─────────────────────────────────────────────────────────────
// calc 子命令
// ─────────────────────────────────────────────────────────────

/// calc 子命令参数
#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Input: Tristar report file or directory with reports
    pub input: PathBuf,

    /// Output directory (default: next to input files)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Lower pore width bound for user-window summaries (nm)
    #[arg(long, default_value_t = 2.5)]
    pub pore_min: f64,

    /// Upper pore width bound for user-window summaries (nm)
    #[arg(long, default_value_t = 90.0)]
    pub pore_max: f64,

    /// Generate isotherm and pore size distribution plots
    #[arg(long, default_value_t = false)]
    pub plot: bool,

    /// Plot image format
    #[arg(long, value_enum, default_value = "png")]
    pub format: PlotFormat,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Glob pattern for input files (batch mode)
    #[arg(long, default_value = "*.txt")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

// ─────────────────────────────────────────────────────────────
// encode 子命令
// ─────────────────────────────────────────────────────────────

/// encode 子命令参数
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Input: report file or directory with legacy ANSI reports
    pub input: PathBuf,

    /// Glob pattern for input files (batch mode)
    #[arg(long, default_value = "*.txt")]
    pub pattern: String,

    /// Re-encode without asking (files are overwritten in place)
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
