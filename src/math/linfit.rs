//! # 最小二乘直线拟合
//!
//! 实现带参数标准误差的直线拟合，用于 BET 变换数据
//! 和 XRF 校准曲线。
//!
//! ## 依赖关系
//! - 被 `adsorption/bet.rs`, `xrf/calibration.rs` 调用

use crate::error::{LabError, Result};

/// 直线拟合结果
#[derive(Debug, Clone)]
pub struct LineFit {
    /// 斜率
    pub slope: f64,
    /// 截距（过原点拟合时为 0）
    pub intercept: f64,
    /// 斜率标准误差
    pub slope_err: f64,
    /// 截距标准误差
    pub intercept_err: f64,
    /// Pearson 相关系数 r
    pub r_value: f64,
}

impl LineFit {
    /// 决定系数 r²
    pub fn r_squared(&self) -> f64 {
        self.r_value * self.r_value
    }

    /// 在 x 处求拟合直线的值
    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// 普通最小二乘直线拟合 y = a·x + b
///
/// 参数标准误差取自残差方差，r 为 Pearson 相关系数。
/// 至少需要 3 个点。
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit> {
    let n = x.len().min(y.len());
    if n < 3 {
        return Err(LabError::NotEnoughData {
            what: "line fit".to_string(),
            got: n,
            need: 3,
        });
    }

    let nf = n as f64;
    let mean_x = x.iter().take(n).sum::<f64>() / nf;
    let mean_y = y.iter().take(n).sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx < 1e-300 {
        return Err(LabError::FitError(
            "all x values are identical".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let r_value = if syy < 1e-300 {
        0.0
    } else {
        sxy / (sxx * syy).sqrt()
    };

    // 残差方差 s² = Σ(y - ŷ)² / (n - 2)
    let mut ss_res = 0.0;
    for i in 0..n {
        let res = y[i] - (slope * x[i] + intercept);
        ss_res += res * res;
    }
    let s2 = ss_res / (nf - 2.0);

    let slope_err = (s2 / sxx).sqrt();
    let intercept_err = (s2 * (1.0 / nf + mean_x * mean_x / sxx)).sqrt();

    Ok(LineFit {
        slope,
        intercept,
        slope_err,
        intercept_err,
        r_value,
    })
}

/// 过原点最小二乘直线拟合 y = a·x
pub fn fit_line_through_origin(x: &[f64], y: &[f64]) -> Result<LineFit> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Err(LabError::NotEnoughData {
            what: "line fit through origin".to_string(),
            got: n,
            need: 2,
        });
    }

    let sxx: f64 = x.iter().take(n).map(|v| v * v).sum();
    let sxy: f64 = (0..n).map(|i| x[i] * y[i]).sum();

    if sxx < 1e-300 {
        return Err(LabError::FitError(
            "all x values are identical".to_string(),
        ));
    }

    let slope = sxy / sxx;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    let mean_y = y.iter().take(n).sum::<f64>() / n as f64;
    for i in 0..n {
        let res = y[i] - slope * x[i];
        ss_res += res * res;
        let dy = y[i] - mean_y;
        ss_tot += dy * dy;
    }

    let s2 = ss_res / (n as f64 - 1.0);
    let slope_err = (s2 / sxx).sqrt();

    let r_value = if ss_tot < 1e-300 {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).max(0.0).sqrt()
    };

    Ok(LineFit {
        slope,
        intercept: 0.0,
        slope_err,
        intercept_err: 0.0,
        r_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_line() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.5 * v + 1.0).collect();

        let fit = fit_line(&x, &y).unwrap();
        assert!((fit.slope - 2.5).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!((fit.r_value - 1.0).abs() < 1e-9);
        assert!(fit.slope_err < 1e-9);
        assert!(fit.intercept_err < 1e-9);
    }

    #[test]
    fn test_noisy_line_errors_positive() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        // 确定性的"噪声"
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 3.0 * v - 2.0 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();

        let fit = fit_line(&x, &y).unwrap();
        assert!((fit.slope - 3.0).abs() < 0.05);
        assert!((fit.intercept - (-2.0)).abs() < 0.5);
        assert!(fit.slope_err > 0.0);
        assert!(fit.intercept_err > 0.0);
        assert!(fit.r_value > 0.99);
    }

    #[test]
    fn test_through_origin() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![2.0, 4.0, 6.0, 8.0];

        let fit = fit_line_through_origin(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!(fit.intercept.abs() < 1e-12);
        assert!((fit.r_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let x = vec![1.0, 2.0];
        let y = vec![1.0, 2.0];
        assert!(fit_line(&x, &y).is_err());
    }
}
