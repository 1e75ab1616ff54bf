//! # ftir 子命令 CLI 定义
//!
//! 红外光谱窗口积分参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/ftir.rs`

use crate::cli::adsorption::PlotFormat;

use clap::Args;
use std::path::PathBuf;

/// ftir 子命令参数
#[derive(Args, Debug)]
pub struct FtirArgs {
    /// Input: two-column CSV spectrum (wavenumber cm⁻¹, absorbance)
    pub input: PathBuf,

    /// Comma separated integration windows in cm⁻¹ (e.g. "1000-1200,2800-3000")
    #[arg(short, long)]
    pub windows: String,

    /// Subtract a linear baseline anchored at the window endpoints
    #[arg(short, long, default_value_t = false)]
    pub baseline: bool,

    /// Sample mass in mg for normalized integrals
    #[arg(short, long)]
    pub mass: Option<f64>,

    /// CSV file for the integration results (default: <input>_integrals.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Generate a spectrum plot with shaded integration windows
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

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
