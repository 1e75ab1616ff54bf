//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `utils/`
//! - 子模块: adsorption, xrf, ftir

pub mod adsorption;
pub mod ftir;
pub mod xrf;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Adsorption(args) => adsorption::execute(args),
        Commands::Xrf(args) => xrf::execute(args),
        Commands::Ftir(args) => ftir::execute(args),
    }
}
