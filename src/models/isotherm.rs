//! # 吸附等温线数据模型
//!
//! 存储 Tristar 报告中的吸附-脱附等温线和带单位的汇总值。
//!
//! ## 依赖关系
//! - 被 `parsers/tristar.rs` 构造
//! - 被 `adsorption/bet.rs`, `adsorption/bjh.rs` 使用

/// 带单位的汇总值（报告首部的单值条目）
#[derive(Debug, Clone)]
pub struct SummaryValue {
    /// 条目名称，如 "BET surface area"
    pub name: String,
    /// 单位，如 "m²/g"
    pub unit: String,
    /// 数值；报告中未找到时为 None
    pub value: Option<f64>,
}

impl SummaryValue {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, value: Option<f64>) -> Self {
        SummaryValue {
            name: name.into(),
            unit: unit.into(),
            value,
        }
    }
}

/// 吸附-脱附等温线
///
/// 每个点为 (相对压力 p/p°, 吸附量 cm³/g STP)。
/// 吸附支按压力升序，脱附支按压力降序存储。
#[derive(Debug, Clone, Default)]
pub struct Isotherm {
    /// 吸附支（压力升序）
    pub adsorption: Vec<(f64, f64)>,
    /// 脱附支（压力降序）
    pub desorption: Vec<(f64, f64)>,
}

impl Isotherm {
    /// 由两条原始分支组装等温线
    ///
    /// 两支先拼接成单条曲线再按全局最大压力点切回两支，
    /// 处理吸附支和脱附支最大压力不一致的仪器输出。
    pub fn assemble(mut ads: Vec<(f64, f64)>, mut des: Vec<(f64, f64)>) -> Self {
        ads.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        des.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut joined = ads;
        joined.extend(des);

        if joined.is_empty() {
            return Isotherm::default();
        }

        // 全局最大压力点，转折点归属吸附支
        let max_idx = joined
            .iter()
            .enumerate()
            .max_by(|a, b| {
                a.1 .0
                    .partial_cmp(&b.1 .0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0);

        let desorption = joined.split_off(max_idx);
        let mut adsorption = joined;
        adsorption.push(desorption[0]);

        Isotherm {
            adsorption,
            desorption,
        }
    }

    /// 完整曲线：吸附支升压 + 脱附支降压（转折点只出现一次）
    pub fn combined(&self) -> Vec<(f64, f64)> {
        let mut all = self.adsorption.clone();
        all.extend(self.desorption.iter().skip(1).cloned());
        all
    }

    /// 等温线中的点总数
    pub fn len(&self) -> usize {
        self.combined().len()
    }

    pub fn is_empty(&self) -> bool {
        self.adsorption.is_empty() && self.desorption.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_splits_at_max_pressure() {
        let ads = vec![(0.1, 10.0), (0.3, 20.0), (0.9, 50.0)];
        let des = vec![(0.95, 55.0), (0.5, 40.0), (0.2, 15.0)];

        let iso = Isotherm::assemble(ads, des);

        // 全局最大压力 0.95 在脱附支，转折点共享
        assert_eq!(iso.adsorption.last().unwrap().0, 0.95);
        assert_eq!(iso.desorption.first().unwrap().0, 0.95);
        // 吸附支升序
        for w in iso.adsorption.windows(2) {
            assert!(w[0].0 <= w[1].0);
        }
        // 脱附支降序
        for w in iso.desorption.windows(2) {
            assert!(w[0].0 >= w[1].0);
        }
    }

    #[test]
    fn test_assemble_unsorted_input() {
        let ads = vec![(0.3, 20.0), (0.1, 10.0), (0.8, 45.0)];
        let des = vec![(0.2, 15.0), (0.6, 42.0)];

        let iso = Isotherm::assemble(ads, des);
        assert_eq!(iso.adsorption.first().unwrap().0, 0.1);
        assert_eq!(iso.adsorption.last().unwrap().0, 0.8);
    }

    #[test]
    fn test_combined_no_duplicate_turnaround() {
        let ads = vec![(0.1, 10.0), (0.9, 50.0)];
        let des = vec![(0.9, 50.0), (0.3, 30.0)];

        let iso = Isotherm::assemble(ads, des);
        let combined = iso.combined();
        // 0.1, 0.9, 0.3 — 转折点只出现一次
        assert_eq!(combined.len(), 3);
    }

    #[test]
    fn test_empty() {
        let iso = Isotherm::assemble(vec![], vec![]);
        assert!(iso.is_empty());
    }
}
