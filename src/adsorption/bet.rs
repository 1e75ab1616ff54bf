//! # BET 比表面积计算
//!
//! 对吸附支在线性区 (0.05 < p/p° < 0.3) 做 BET 变换
//! y = 1/(q·(1/p − 1))，直线拟合后由斜率与截距之和求
//! 比表面积。
//!
//! ## 常数
//! SSA = V_m · σ(N₂)·N_A / V₀ = 4.35255551372 / (slope + intercept)
//! 其中 σ(N₂) = 16.2 Å²，V₀ = 22400 cm³/mol（STP 摩尔体积）。
//!
//! ## 依赖关系
//! - 被 `commands/adsorption/calc.rs` 调用
//! - 使用 `math/linfit.rs`

use crate::error::{LabError, Result};
use crate::math::{fit_line, LineFit};

/// BET 线性区默认下限 (p/p°)
pub const BET_PRESSURE_MIN: f64 = 0.05;
/// BET 线性区默认上限 (p/p°)
pub const BET_PRESSURE_MAX: f64 = 0.3;

/// (σ_N2 · N_A) / V₀，将 1/(slope+intercept) 换算为 m²/g
const SSA_FACTOR: f64 = 4.35255551372;

/// BET 计算结果
#[derive(Debug, Clone)]
pub struct BetResult {
    /// 比表面积 (m²/g)
    pub surface_area: f64,
    /// 比表面积误差 (m²/g)，3σ
    pub surface_area_err: f64,
    /// 拟合相关系数 r
    pub r_value: f64,
    /// 变换后的数据点 (p/p°, 1/(q·(1/p − 1)))
    pub points: Vec<(f64, f64)>,
    /// 直线拟合参数
    pub fit: LineFit,
}

/// 从吸附支计算 BET 比表面积
///
/// `ads` 为 (相对压力, 吸附量 cm³/g STP)，只使用
/// (p_min, p_max) 区间内的点；至少需要 3 个点。
pub fn calc_bet(ads: &[(f64, f64)], p_min: f64, p_max: f64) -> Result<BetResult> {
    let points: Vec<(f64, f64)> = ads
        .iter()
        .filter(|(p, q)| *p > p_min && *p < p_max && *q > 0.0)
        .map(|&(p, q)| (p, 1.0 / (q * (1.0 / p - 1.0))))
        .collect();

    if points.len() < 3 {
        return Err(LabError::NotEnoughData {
            what: format!("BET fit in {:.2} < p/p° < {:.2}", p_min, p_max),
            got: points.len(),
            need: 3,
        });
    }

    let x: Vec<f64> = points.iter().map(|(p, _)| *p).collect();
    let y: Vec<f64> = points.iter().map(|(_, t)| *t).collect();
    let fit = fit_line(&x, &y)?;

    let denom = fit.slope + fit.intercept;
    if denom.abs() < 1e-300 {
        return Err(LabError::FitError(
            "BET fit: slope + intercept is zero".to_string(),
        ));
    }

    let surface_area = SSA_FACTOR / denom;
    let surface_area_err = 3.0
        * surface_area
        * (fit.slope_err * fit.slope_err + fit.intercept_err * fit.intercept_err).sqrt()
        / denom;

    Ok(BetResult {
        surface_area,
        surface_area_err: surface_area_err.abs(),
        r_value: fit.r_value,
        points,
        fit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 用理想 BET 等温线构造吸附支：
    /// q = v_m·C·p / ((1−p)·(1 + (C−1)·p))
    fn ideal_bet_branch(v_m: f64, c: f64) -> Vec<(f64, f64)> {
        (1..60)
            .map(|i| {
                let p = i as f64 * 0.005 + 0.04;
                let q = v_m * c * p / ((1.0 - p) * (1.0 + (c - 1.0) * p));
                (p, q)
            })
            .collect()
    }

    #[test]
    fn test_ideal_isotherm_recovers_ssa() {
        let v_m = 50.0; // cm³/g
        let branch = ideal_bet_branch(v_m, 100.0);

        let result = calc_bet(&branch, BET_PRESSURE_MIN, BET_PRESSURE_MAX).unwrap();

        // 理想数据下 SSA = SSA_FACTOR · v_m
        let expected = SSA_FACTOR * v_m;
        assert!(
            (result.surface_area - expected).abs() / expected < 1e-6,
            "expected {} got {}",
            expected,
            result.surface_area
        );
        assert!((result.r_value - 1.0).abs() < 1e-9);
        assert!(result.surface_area_err < expected * 1e-6);
    }

    #[test]
    fn test_pressure_window_respected() {
        let branch = ideal_bet_branch(30.0, 80.0);
        let result = calc_bet(&branch, 0.05, 0.3).unwrap();
        for (p, _) in &result.points {
            assert!(*p > 0.05 && *p < 0.3);
        }
    }

    #[test]
    fn test_too_few_points() {
        let branch = vec![(0.1, 10.0), (0.2, 20.0)];
        assert!(calc_bet(&branch, 0.05, 0.3).is_err());
    }
}
