//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `adsorption`: 气体吸附分析（嵌套子命令）
//!   - `parse`: 解析 Tristar 导出报告
//!   - `calc`: BET / BJH 计算
//!   - `encode`: 旧版 ANSI 文件转 UTF-16-LE
//! - `xrf`: XRF 元素含量分析（嵌套子命令）
//!   - `calibrate`: 建立校准曲线
//!   - `analyze`: 应用校准计算含量
//!   - `list-calibs`: 列出可用校准
//! - `ftir`: 红外光谱窗口积分
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: adsorption, xrf, ftir

pub mod adsorption;
pub mod ftir;
pub mod xrf;

use clap::{Parser, Subcommand};

/// labutil - 实验室仪器数据分析统一工具箱
#[derive(Parser)]
#[command(name = "labutil")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "A unified laboratory instrument data analysis toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Analyze Micromeritics Tristar II gas adsorption exports
    Adsorption(adsorption::AdsorptionArgs),

    /// Analyze element content from Olympus Delta XRF spectra
    Xrf(xrf::XrfArgs),

    /// Integrate FTIR spectrum over wavenumber windows
    Ftir(ftir::FtirArgs),
}
