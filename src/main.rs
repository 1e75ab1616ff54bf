//! # labutil - 实验室仪器数据分析统一工具箱
//!
//! 将分散的仪器数据处理脚本用 Rust 重构，统一成单一可执行文件。
//!
//! ## 子命令
//! - `adsorption` - 气体吸附分析 (Micromeritics Tristar II)
//!   - `parse`  - 解析仪器报告，导出表格和汇总
//!   - `calc`   - 从等温线计算 BET 比表面积和 BJH 孔径分布
//!   - `encode` - 旧版 ANSI 报告转 UTF-16-LE
//! - `xrf` - X 射线荧光元素含量分析 (Olympus Delta)
//!   - `calibrate`   - 用标样建立元素校准曲线
//!   - `analyze`     - 用校准曲线计算未知样品元素含量
//!   - `list-calibs` - 列出可用校准文件
//! - `ftir` - 红外光谱波数窗口积分
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/    (仪器文件解析器)
//!   │     ├── adsorption/ (BET/BJH 计算)
//!   │     ├── xrf/        (峰积分与校准)
//!   │     ├── ftir/       (窗口积分)
//!   │     └── models/     (数据模型)
//!   ├── math/       (数值算法: 拟合、平滑、积分)
//!   ├── batch/      (批量处理)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod adsorption;
mod batch;
mod cli;
mod commands;
mod error;
mod ftir;
mod math;
mod models;
mod parsers;
mod report;
mod utils;
mod xrf;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
