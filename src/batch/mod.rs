//! # 批量处理模块
//!
//! 提供目录批处理支撑：
//! - `collector`: 按模式收集待处理的仪器数据文件
//! - `runner`: rayon 并行执行器，带进度条和结果统计
//!
//! ## 依赖关系
//! - 被 `commands/` 各子命令调用

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
