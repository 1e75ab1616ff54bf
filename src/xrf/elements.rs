//! # XRF 元素数据库
//!
//! 每个元素给出最适合的束流编号、Savitzky-Golay 平滑窗口、
//! 峰积分区间 (keV) 以及摩尔质量 (g/mol)。
//!
//! ## 依赖关系
//! - 被 `xrf/peaks.rs`、`commands/xrf/` 调用

use crate::error::{LabError, Result};

/// 单个元素的分析参数
#[derive(Debug, Clone)]
pub struct ElementData {
    /// 元素符号，如 "Au"
    pub symbol: &'static str,
    /// 零基束流编号
    pub beam: u32,
    /// Savitzky-Golay 平滑窗口（奇数）
    pub filter_window: usize,
    /// 峰积分区间 (keV)
    pub peaks: Vec<(f64, f64)>,
    /// 摩尔质量 (g/mol)
    pub molar_mass: f64,
}

/// 内置元素数据库
///
/// 束流与积分区间按 Olympus Delta 的三束流配置选取：
/// 轻元素 (Si K 线) 用低能束流 2，贵金属 L 线用束流 1，
/// Ag K 线能量高，用束流 0。
pub fn element_db() -> Vec<ElementData> {
    vec![
        ElementData {
            symbol: "Si",
            beam: 2,
            filter_window: 9,
            peaks: vec![(1.5, 2.0)],
            molar_mass: 28.0855,
        },
        ElementData {
            symbol: "Au",
            beam: 1,
            filter_window: 17,
            peaks: vec![(9.4, 10.0), (10.75, 12.25)],
            molar_mass: 196.96657,
        },
        ElementData {
            symbol: "Ag",
            beam: 0,
            filter_window: 17,
            peaks: vec![(21.5, 22.8)],
            molar_mass: 107.8682,
        },
        ElementData {
            symbol: "Cu",
            beam: 1,
            filter_window: 17,
            peaks: vec![(7.8, 8.3)],
            molar_mass: 63.546,
        },
        ElementData {
            symbol: "Pt",
            beam: 1,
            filter_window: 17,
            peaks: vec![(9.2, 9.8), (10.8, 11.4)],
            molar_mass: 195.084,
        },
    ]
}

/// 按符号查找元素
pub fn lookup_element(symbol: &str) -> Result<ElementData> {
    element_db()
        .into_iter()
        .find(|el| el.symbol.eq_ignore_ascii_case(symbol))
        .ok_or_else(|| LabError::UnknownElement(symbol.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_elements() {
        let au = lookup_element("Au").unwrap();
        assert_eq!(au.beam, 1);
        assert_eq!(au.filter_window, 17);
        assert_eq!(au.peaks.len(), 2);

        let si = lookup_element("Si").unwrap();
        assert_eq!(si.beam, 2);
        assert_eq!(si.peaks, vec![(1.5, 2.0)]);
    }

    #[test]
    fn test_lookup_case_insensitive() {
        assert!(lookup_element("au").is_ok());
        assert!(lookup_element("SI").is_ok());
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup_element("Xx").is_err());
    }

    #[test]
    fn test_filter_windows_are_odd() {
        for el in element_db() {
            assert_eq!(el.filter_window % 2, 1, "{} window must be odd", el.symbol);
        }
    }
}
