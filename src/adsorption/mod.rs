//! # 气体吸附分析模块
//!
//! 从吸附-脱附等温线计算 BET 比表面积和 BJH 孔径分布。
//!
//! ## 子模块
//! - `bet`: BET 比表面积拟合
//! - `bjh`: BJH 孔径分布（Kelvin + Halsey）
//! - `plot`: 等温线与孔径分布图
//!
//! ## 依赖关系
//! - 被 `commands/adsorption/calc.rs` 使用
//! - 使用 `models/isotherm.rs`, `math/linfit.rs`

pub mod bet;
pub mod bjh;
pub mod plot;

pub use bet::{calc_bet, BetResult};
pub use bjh::{calc_bjh, BjhResult, BjhSummary};
