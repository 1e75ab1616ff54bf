//! # adsorption 子命令实现
//!
//! 气体吸附分析：
//! - `parse`: 从 Tristar 报告提取汇总值和数据表到 CSV
//! - `calc`: 从等温线计算 BET / BJH 并导出
//! - `encode`: 旧版 ANSI 报告转 UTF-16-LE
//!
//! ## 依赖关系
//! - 使用 `cli/adsorption.rs` 定义的参数
//! - 子模块: parse, calc, encode

pub mod calc;
pub mod encode;
pub mod parse;

use crate::cli::adsorption::{AdsorptionArgs, AdsorptionCommands};
use crate::error::Result;

/// 执行 adsorption 子命令
pub fn execute(args: AdsorptionArgs) -> Result<()> {
    match args.command {
        AdsorptionCommands::Parse(args) => parse::execute(args),
        AdsorptionCommands::Calc(args) => calc::execute(args),
        AdsorptionCommands::Encode(args) => encode::execute(args),
    }
}
