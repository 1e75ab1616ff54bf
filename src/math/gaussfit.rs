//! # 高斯峰拟合
//!
//! 用带阻尼的 Gauss-Newton 迭代拟合
//! y = baseline + A·exp(−(x−µ)²/2σ²)。
//!
//! ## 依赖关系
//! - 被 `xrf/peaks.rs` 调用
//! - 使用 `math/mod.rs` 的 solve_linear_system

use super::solve_linear_system;
use crate::error::{LabError, Result};

/// 高斯拟合结果
#[derive(Debug, Clone)]
pub struct GaussianFit {
    /// 基线
    pub baseline: f64,
    /// 峰幅值
    pub amplitude: f64,
    /// 峰中心
    pub center: f64,
    /// 峰宽 σ
    pub sigma: f64,
}

impl GaussianFit {
    /// 在 x 处求拟合曲线的值
    pub fn evaluate(&self, x: f64) -> f64 {
        let d = x - self.center;
        self.baseline + self.amplitude * (-d * d / (2.0 * self.sigma * self.sigma)).exp()
    }
}

const MAX_ITER: usize = 200;
const TOLERANCE: f64 = 1e-10;

/// 拟合高斯峰
///
/// 初值从数据估计：基线取最小值，中心取最大值位置，
/// σ 取窗口宽度的四分之一。不收敛时返回 FitError，
/// 调用方可回退到原始数据求和。
pub fn fit_gaussian(x: &[f64], y: &[f64]) -> Result<GaussianFit> {
    let n = x.len().min(y.len());
    if n < 5 {
        return Err(LabError::NotEnoughData {
            what: "gaussian fit".to_string(),
            got: n,
            need: 5,
        });
    }

    // 初值估计
    let y_min = y.iter().take(n).cloned().fold(f64::INFINITY, f64::min);
    let (i_max, y_max) = y
        .iter()
        .take(n)
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |acc, (i, &v)| {
            if v > acc.1 {
                (i, v)
            } else {
                acc
            }
        });

    let span = (x[n - 1] - x[0]).abs().max(1e-12);
    let mut p = [y_min, (y_max - y_min).max(1e-12), x[i_max], span / 4.0];

    let mut lambda = 1e-3;
    let mut chi2 = chi_squared(x, y, n, &p);

    for _ in 0..MAX_ITER {
        // 构造 JᵀJ 和 Jᵀr
        let mut jtj = vec![vec![0.0f64; 4]; 4];
        let mut jtr = vec![0.0f64; 4];

        for i in 0..n {
            let d = x[i] - p[2];
            let s2 = p[3] * p[3];
            let e = (-d * d / (2.0 * s2)).exp();
            let model = p[0] + p[1] * e;
            let r = y[i] - model;

            // 对 [baseline, A, µ, σ] 的偏导
            let jac = [
                1.0,
                e,
                p[1] * e * d / s2,
                p[1] * e * d * d / (s2 * p[3]),
            ];

            for a in 0..4 {
                jtr[a] += jac[a] * r;
                for b in 0..4 {
                    jtj[a][b] += jac[a] * jac[b];
                }
            }
        }

        // Levenberg 阻尼
        let mut damped = jtj.clone();
        for a in 0..4 {
            damped[a][a] *= 1.0 + lambda;
        }
        let mut rhs = jtr.clone();

        let delta = match solve_linear_system(&mut damped, &mut rhs) {
            Some(d) => d,
            None => {
                return Err(LabError::FitError(
                    "gaussian fit: singular normal equations".to_string(),
                ))
            }
        };

        let trial = [
            p[0] + delta[0],
            p[1] + delta[1],
            p[2] + delta[2],
            p[3] + delta[3],
        ];

        // σ 不能塌缩到零
        if trial[3].abs() < span * 1e-6 {
            return Err(LabError::FitError(
                "gaussian fit: sigma collapsed".to_string(),
            ));
        }

        let trial_chi2 = chi_squared(x, y, n, &trial);

        if trial_chi2 < chi2 {
            let improvement = chi2 - trial_chi2;
            p = trial;
            chi2 = trial_chi2;
            lambda = (lambda * 0.5).max(1e-12);

            if improvement < TOLERANCE * (1.0 + chi2) {
                return Ok(GaussianFit {
                    baseline: p[0],
                    amplitude: p[1],
                    center: p[2],
                    sigma: p[3].abs(),
                });
            }
        } else {
            lambda *= 10.0;
            if lambda > 1e12 {
                return Err(LabError::FitError(
                    "gaussian fit: did not converge".to_string(),
                ));
            }
        }
    }

    Err(LabError::FitError(
        "gaussian fit: iteration limit reached".to_string(),
    ))
}

fn chi_squared(x: &[f64], y: &[f64], n: usize, p: &[f64; 4]) -> f64 {
    let mut sum = 0.0;
    for i in 0..n {
        let d = x[i] - p[2];
        let model = p[0] + p[1] * (-d * d / (2.0 * p[3] * p[3])).exp();
        let r = y[i] - model;
        sum += r * r;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recover_synthetic_gaussian() {
        let x: Vec<f64> = (0..80).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&v| {
                let d: f64 = v - 4.0;
                0.5 + 3.0 * (-d * d / (2.0 * 0.6 * 0.6)).exp()
            })
            .collect();

        let fit = fit_gaussian(&x, &y).unwrap();
        assert!((fit.baseline - 0.5).abs() < 1e-4);
        assert!((fit.amplitude - 3.0).abs() < 1e-4);
        assert!((fit.center - 4.0).abs() < 1e-4);
        assert!((fit.sigma - 0.6).abs() < 1e-4);
    }

    #[test]
    fn test_fit_evaluate_matches_peak() {
        let x: Vec<f64> = (0..50).map(|i| 9.0 + i as f64 * 0.02).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&v| {
                let d: f64 = v - 9.5;
                10.0 + 120.0 * (-d * d / (2.0 * 0.08 * 0.08)).exp()
            })
            .collect();

        let fit = fit_gaussian(&x, &y).unwrap();
        let peak_value = fit.evaluate(fit.center);
        assert!((peak_value - 130.0).abs() < 0.5);
    }

    #[test]
    fn test_too_few_points() {
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 1.0, 0.0];
        assert!(fit_gaussian(&x, &y).is_err());
    }
}
