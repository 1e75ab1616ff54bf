//! # 数据模型模块
//!
//! 定义统一的等温线、光谱与汇总值数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `commands/` 使用
//! - 子模块: isotherm, spectrum

pub mod isotherm;
pub mod spectrum;

pub use isotherm::{Isotherm, SummaryValue};
pub use spectrum::{Spectrum, XrfSpectraSet};
