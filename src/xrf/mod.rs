//! # XRF 光谱分析模块
//!
//! 手持式 XRF 能谱的元素含量分析：
//! - 内置元素数据库（束流编号、平滑窗口、峰积分区间、摩尔质量）
//! - 峰积分（Savitzky-Golay 平滑 + 高斯拟合）
//! - 样品架本底扣除
//! - 校准曲线的建立、存取与应用
//!
//! ## 依赖关系
//! - 被 `commands/xrf/` 调用
//! - 使用 `models/spectrum.rs` 的 XrfSpectraSet
//! - 使用 `math/` 的拟合与平滑

pub mod calibration;
pub mod elements;
pub mod peaks;
pub mod plot;

pub use calibration::{ElementCalibration, PeakCalibration};
pub use elements::{element_db, lookup_element, ElementData};
pub use peaks::{element_integrals, peak_integrals, HolderPlan, SampleIntegrals};
