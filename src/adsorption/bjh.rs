//! # BJH 孔径分布计算
//!
//! 对等温线单支（吸附或脱附）按 BJH (Barrett-Joyner-Halenda)
//! 方法计算孔径分布。孔芯半径由 Kelvin 方程给出，
//! 吸附膜厚度由 Halsey 方程给出：
//!
//! - r_k = −0.415 / log10(p/p°)  (nm)
//! - t   = sqrt(0.1399 / (0.034 − log10(p/p°)))  (nm)
//!
//! 每个压力区间给出孔宽 w、增量体积 dV、增量面积 dA、
//! 累积量以及微分分布 dV/dw、dV/dlog(w)、dA/dw、dA/dlog(w)。
//! 汇总值同时在全范围和用户孔宽窗口（默认 2.5–90 nm）内给出。
//!
//! ## 依赖关系
//! - 被 `commands/adsorption/calc.rs` 调用

use crate::error::{LabError, Result};

/// 用户孔宽窗口默认下限 (nm)
pub const PORE_WIDTH_MIN: f64 = 2.5;
/// 用户孔宽窗口默认上限 (nm)
pub const PORE_WIDTH_MAX: f64 = 90.0;

/// N₂ 气体 (STP) 体积换算为液氮体积的系数 (cm³ liq. / cm³ STP)
const GAS_TO_LIQUID: f64 = 0.0015468;

/// BJH 汇总值（某一孔宽范围内）
#[derive(Debug, Clone, Copy)]
pub struct BjhSummary {
    /// 累积孔体积 (cm³/g)
    pub total_volume: f64,
    /// 累积孔面积 (m²/g)
    pub total_area: f64,
    /// dV/dw 最大处的孔宽 (nm)
    pub mode_width: f64,
    /// 体积加权平均孔宽 Σ(w·dV)/ΣdV (nm)
    pub average_width: f64,
}

/// BJH 计算结果
///
/// 各向量长度一致，每个元素对应一个压力区间。
#[derive(Debug, Clone)]
pub struct BjhResult {
    /// 孔宽 (nm)
    pub widths: Vec<f64>,
    /// 增量孔体积 (cm³/g)
    pub dv: Vec<f64>,
    /// 累积孔体积 (cm³/g)
    pub v: Vec<f64>,
    /// dV/dw (cm³/(nm·g))，负值截断为 0
    pub dv_dw: Vec<f64>,
    /// dV/dlog(w) (cm³/g)，负值截断为 0
    pub dv_dlogw: Vec<f64>,
    /// 增量孔面积 (m²/g)
    pub da: Vec<f64>,
    /// 累积孔面积 (m²/g)
    pub a: Vec<f64>,
    /// dA/dw (m²/(nm·g))，负值截断为 0
    pub da_dw: Vec<f64>,
    /// dA/dlog(w) (m²/g)，负值截断为 0
    pub da_dlogw: Vec<f64>,
    /// 全范围汇总
    pub full: BjhSummary,
    /// 用户孔宽窗口内汇总
    pub window: BjhSummary,
}

/// 对一条等温线支做 BJH 计算
///
/// `branch` 为 (相对压力, 吸附量 cm³/g STP)，顺序任意，
/// 内部按压力降序处理；压力不在 (0, 1) 内的点被丢弃。
/// `w_min`/`w_max` 为用户孔宽窗口 (nm)。
pub fn calc_bjh(branch: &[(f64, f64)], w_min: f64, w_max: f64) -> Result<BjhResult> {
    if w_min >= w_max || w_min < 0.0 {
        return Err(LabError::InvalidRange(format!(
            "pore width window {} .. {} nm",
            w_min, w_max
        )));
    }

    let mut points: Vec<(f64, f64)> = branch
        .iter()
        .filter(|(p, _)| *p > 0.0 && *p < 1.0)
        .copied()
        .collect();
    points.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let n = points.len();
    if n < 3 {
        return Err(LabError::NotEnoughData {
            what: "BJH isotherm branch (0 < p/p° < 1)".to_string(),
            got: n,
            need: 3,
        });
    }

    // Kelvin 孔芯半径与 Halsey 膜厚
    let radii: Vec<f64> = points.iter().map(|(p, _)| -0.415 / p.log10()).collect();
    let film: Vec<f64> = points
        .iter()
        .map(|(p, _)| (0.1399 / (0.034 - p.log10())).sqrt())
        .collect();

    // 区间孔宽：相邻两点孔芯直径与膜厚之和，首点无区间
    let mut widths = vec![0.0; n];
    for i in 1..n {
        widths[i] = radii[i] + radii[i - 1] + film[i] + film[i - 1];
    }

    let mut helper = vec![0.0; n];
    let mut dv = vec![0.0; n];
    let mut da = vec![0.0; n];
    let mut v = vec![0.0; n];
    let mut a = vec![0.0; n];
    let mut dv_dw = vec![0.0; n];
    let mut da_dw = vec![0.0; n];
    let mut dv_dlogw = vec![0.0; n];
    let mut da_dlogw = vec![0.0; n];

    // 逐区间递推，helper 累积已开裂孔壁上的膜退吸附贡献
    for i in 1..n {
        let half_w = widths[i] / 2.0;
        let core = half_w - film[i];
        if core.abs() < 1e-12 {
            continue;
        }

        helper[i] = da[i - 1] / 1000.0 * (1.0 - film[i] / half_w) + helper[i - 1];

        let ratio = widths[i] / core;
        dv[i] = ratio * ratio
            * (GAS_TO_LIQUID * (points[i - 1].1 - points[i].1)
                - (film[i - 1] - film[i]) * helper[i])
            / 4.0;
        v[i] = v[i - 1] + dv[i];

        da[i] = 4000.0 * dv[i] / widths[i];
        a[i] = a[i - 1] + da[i];

        let dd = radii[i - 1] + film[i - 1] - radii[i] - film[i];
        if dd.abs() > 1e-12 {
            dv_dw[i] = dv[i] / dd / 2.0;
            da_dw[i] = da[i] / dd / 2.0;
        }

        let dlogd = (radii[i - 1].log10() + film[i - 1].log10()
            - radii[i].log10()
            - film[i].log10())
            / 2.0;
        if dlogd.abs() > 1e-12 {
            dv_dlogw[i] = dv[i] / dlogd;
            da_dlogw[i] = da[i] / dlogd;
        }
    }

    let full = summarize(&widths, &v, &a, &dv, &dv_dw, 0.0, f64::INFINITY)?;
    let window = summarize(&widths, &v, &a, &dv, &dv_dw, w_min, w_max)?;

    // 汇总完成后再截断负微分值
    for arr in [&mut dv_dw, &mut da_dw, &mut dv_dlogw, &mut da_dlogw] {
        for val in arr.iter_mut() {
            if *val < 0.0 {
                *val = 0.0;
            }
        }
    }

    // 首行无区间，全为零，丢弃
    Ok(BjhResult {
        widths: widths[1..].to_vec(),
        dv: dv[1..].to_vec(),
        v: v[1..].to_vec(),
        dv_dw: dv_dw[1..].to_vec(),
        dv_dlogw: dv_dlogw[1..].to_vec(),
        da: da[1..].to_vec(),
        a: a[1..].to_vec(),
        da_dw: da_dw[1..].to_vec(),
        da_dlogw: da_dlogw[1..].to_vec(),
        full,
        window,
    })
}

/// 在孔宽窗口 [w_min, w_max] 内计算汇总值
fn summarize(
    widths: &[f64],
    v: &[f64],
    a: &[f64],
    dv: &[f64],
    dv_dw: &[f64],
    w_min: f64,
    w_max: f64,
) -> Result<BjhSummary> {
    let mut total_volume = f64::NEG_INFINITY;
    let mut total_area = f64::NEG_INFINITY;
    let mut mode_width = 0.0;
    let mut mode_dv_dw = f64::NEG_INFINITY;
    let mut sum_w_dv = 0.0;
    let mut sum_dv = 0.0;
    let mut count = 0usize;

    for i in 1..widths.len() {
        let w = widths[i];
        if w < w_min || w > w_max {
            continue;
        }
        count += 1;
        total_volume = total_volume.max(v[i]);
        total_area = total_area.max(a[i]);
        if dv_dw[i] > mode_dv_dw {
            mode_dv_dw = dv_dw[i];
            mode_width = w;
        }
        sum_w_dv += w * dv[i];
        sum_dv += dv[i];
    }

    if count == 0 {
        return Err(LabError::NotEnoughData {
            what: format!("BJH pore widths in {} .. {} nm", w_min, w_max),
            got: 0,
            need: 1,
        });
    }

    let average_width = if sum_dv.abs() > 1e-300 {
        sum_w_dv / sum_dv
    } else {
        0.0
    };

    Ok(BjhSummary {
        total_volume,
        total_area,
        mode_width,
        average_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造一条递减压力的脱附支：吸附量随压力单调下降
    fn synthetic_branch() -> Vec<(f64, f64)> {
        // 典型脱附数据形状：高压端吸附量大，低压端小
        vec![
            (0.99, 320.0),
            (0.97, 310.0),
            (0.95, 300.0),
            (0.90, 280.0),
            (0.85, 255.0),
            (0.80, 230.0),
            (0.70, 195.0),
            (0.60, 170.0),
            (0.50, 150.0),
            (0.40, 135.0),
            (0.30, 120.0),
            (0.20, 105.0),
            (0.10, 85.0),
        ]
    }

    #[test]
    fn test_kelvin_and_halsey() {
        // p = 0.5: r = -0.415/log10(0.5), t = sqrt(0.1399/(0.034 - log10(0.5)))
        let branch = vec![(0.5, 100.0), (0.4, 90.0), (0.3, 80.0)];
        let result = calc_bjh(&branch, 2.5, 90.0);
        // 窗口里未必有点，这里只验证孔宽数值
        let r0 = -0.415 / 0.5f64.log10();
        let t0 = (0.1399 / (0.034 - 0.5f64.log10())).sqrt();
        let r1 = -0.415 / 0.4f64.log10();
        let t1 = (0.1399 / (0.034 - 0.4f64.log10())).sqrt();
        if let Ok(result) = result {
            assert!((result.widths[0] - (r0 + r1 + t0 + t1)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_monotonic_branch_gives_positive_volumes() {
        let result = calc_bjh(&synthetic_branch(), 2.5, 90.0).unwrap();

        assert_eq!(result.widths.len(), result.dv.len());
        assert_eq!(result.widths.len(), 12);

        // 吸附量单调下降时各区间体积应为正，累积量单调上升
        for i in 1..result.v.len() {
            assert!(result.v[i] >= result.v[i - 1] - 1e-12);
            assert!(result.a[i] >= result.a[i - 1] - 1e-12);
        }
        assert!(result.full.total_volume > 0.0);
        assert!(result.full.total_area > 0.0);
    }

    #[test]
    fn test_widths_descend_with_pressure() {
        let result = calc_bjh(&synthetic_branch(), 2.5, 90.0).unwrap();
        for i in 1..result.widths.len() {
            assert!(result.widths[i] < result.widths[i - 1]);
        }
    }

    #[test]
    fn test_window_summary_subset_of_full() {
        let result = calc_bjh(&synthetic_branch(), 2.5, 90.0).unwrap();
        assert!(result.window.total_volume <= result.full.total_volume + 1e-12);
        assert!(result.window.total_area <= result.full.total_area + 1e-12);
        assert!(result.window.mode_width >= 2.5 && result.window.mode_width <= 90.0);
    }

    #[test]
    fn test_mode_width_at_distribution_peak() {
        let result = calc_bjh(&synthetic_branch(), 2.5, 90.0).unwrap();
        // mode_width 必须等于窗口内 dV/dw 最大处的孔宽
        let mut best = f64::NEG_INFINITY;
        let mut best_w = 0.0;
        for (i, &w) in result.widths.iter().enumerate() {
            if (2.5..=90.0).contains(&w) && result.dv_dw[i] > best {
                best = result.dv_dw[i];
                best_w = w;
            }
        }
        assert!((result.window.mode_width - best_w).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_pressures_dropped() {
        let mut branch = synthetic_branch();
        branch.push((1.0, 330.0));
        branch.push((0.0, 0.0));
        branch.push((1.2, 340.0));
        let with_junk = calc_bjh(&branch, 2.5, 90.0).unwrap();
        let clean = calc_bjh(&synthetic_branch(), 2.5, 90.0).unwrap();
        assert_eq!(with_junk.widths.len(), clean.widths.len());
    }

    #[test]
    fn test_too_few_points() {
        let branch = vec![(0.9, 100.0), (0.8, 90.0)];
        assert!(calc_bjh(&branch, 2.5, 90.0).is_err());
    }

    #[test]
    fn test_invalid_window() {
        assert!(calc_bjh(&synthetic_branch(), 90.0, 2.5).is_err());
    }

    #[test]
    fn test_negative_differentials_clamped() {
        // 吸附量出现回升会产生负的 dV，微分分布应被截断为 0
        let mut branch = synthetic_branch();
        branch[5].1 = 260.0; // 高于前一点
        let result = calc_bjh(&branch, 2.5, 90.0).unwrap();
        for &val in result
            .dv_dw
            .iter()
            .chain(result.da_dw.iter())
            .chain(result.dv_dlogw.iter())
            .chain(result.da_dlogw.iter())
        {
            assert!(val >= 0.0);
        }
    }
}
