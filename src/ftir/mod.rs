//! # FTIR 光谱窗口积分
//!
//! 对红外光谱在指定波数窗口内做梯形积分：
//! - 可选线性基线扣除（以窗口两端点为锚）
//! - 可选按样品质量归一化
//!
//! 波数轴升序或降序均可，积分符号一致。
//!
//! ## 依赖关系
//! - 被 `commands/ftir.rs` 调用
//! - 使用 `models/spectrum.rs` 的 Spectrum
//! - 使用 `math/` 的 trapezoid

pub mod plot;

use crate::error::{LabError, Result};
use crate::math::trapezoid;
use crate::models::Spectrum;

/// 单个积分窗口的结果
#[derive(Debug, Clone)]
pub struct WindowIntegral {
    /// 窗口下限 (cm⁻¹)
    pub lo: f64,
    /// 窗口上限 (cm⁻¹)
    pub hi: f64,
    /// 原始积分值
    pub integral: f64,
    /// 按质量归一化后的积分值 (每 mg)，未给质量时为 None
    pub normalized: Option<f64>,
}

/// 对一组窗口做积分
///
/// `baseline` 为真时在每个窗口内扣除连接两端点的直线基线。
/// `mass_mg` 给出样品质量时额外给出归一化积分。
pub fn integrate_windows(
    spectrum: &Spectrum,
    windows: &[(f64, f64)],
    baseline: bool,
    mass_mg: Option<f64>,
) -> Result<Vec<WindowIntegral>> {
    if spectrum.len() < 2 {
        return Err(LabError::NotEnoughData {
            what: "FTIR spectrum".to_string(),
            got: spectrum.len(),
            need: 2,
        });
    }
    if let Some(mass) = mass_mg {
        if mass <= 0.0 {
            return Err(LabError::InvalidArgument(format!(
                "sample mass must be positive, got {} mg",
                mass
            )));
        }
    }

    let (x_lo, x_hi) = spectrum
        .x_range()
        .ok_or_else(|| LabError::NotEnoughData {
            what: "FTIR spectrum".to_string(),
            got: 0,
            need: 2,
        })?;

    let mut results = Vec::with_capacity(windows.len());
    for &(lo, hi) in windows {
        if lo >= hi {
            return Err(LabError::InvalidRange(format!("{}-{}", lo, hi)));
        }
        if hi < x_lo || lo > x_hi {
            return Err(LabError::InvalidRange(format!(
                "window {}-{} cm⁻¹ is outside the measured range {:.1}-{:.1} cm⁻¹",
                lo, hi, x_lo, x_hi
            )));
        }

        let win = spectrum.window(lo, hi);
        if win.len() < 2 {
            return Err(LabError::NotEnoughData {
                what: format!("FTIR window {}-{} cm⁻¹", lo, hi),
                got: win.len(),
                need: 2,
            });
        }

        let y = if baseline {
            subtract_baseline(&win)
        } else {
            win.y.clone()
        };

        let integral = trapezoid(&win.x, &y);
        results.push(WindowIntegral {
            lo,
            hi,
            integral,
            normalized: mass_mg.map(|m| integral / m),
        });
    }

    Ok(results)
}

/// 扣除连接窗口两端点的直线基线
fn subtract_baseline(win: &Spectrum) -> Vec<f64> {
    let n = win.len();
    let (x0, y0) = (win.x[0], win.y[0]);
    let (x1, y1) = (win.x[n - 1], win.y[n - 1]);
    if (x1 - x0).abs() < 1e-300 {
        return win.y.clone();
    }
    let slope = (y1 - y0) / (x1 - x0);
    win.x
        .iter()
        .zip(win.y.iter())
        .map(|(&x, &y)| y - (y0 + slope * (x - x0)))
        .collect()
}

/// 解析逗号分隔的窗口列表，如 "1000-1200,2800-3000"
pub fn parse_windows(arg: &str) -> Result<Vec<(f64, f64)>> {
    let mut windows = Vec::new();
    for part in arg.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (lo_s, hi_s) = part
            .split_once('-')
            .ok_or_else(|| LabError::InvalidRange(part.to_string()))?;
        let lo: f64 = lo_s
            .trim()
            .parse()
            .map_err(|_| LabError::InvalidRange(part.to_string()))?;
        let hi: f64 = hi_s
            .trim()
            .parse()
            .map_err(|_| LabError::InvalidRange(part.to_string()))?;
        if lo >= hi {
            return Err(LabError::InvalidRange(part.to_string()));
        }
        windows.push((lo, hi));
    }
    if windows.is_empty() {
        return Err(LabError::InvalidArgument(
            "no integration windows supplied".to_string(),
        ));
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_spectrum(ascending: bool) -> Spectrum {
        let mut x: Vec<f64> = (0..=100).map(|i| 1000.0 + 10.0 * i as f64).collect();
        if !ascending {
            x.reverse();
        }
        let y = vec![2.0; x.len()];
        Spectrum::new(x, y)
    }

    #[test]
    fn test_flat_spectrum_integral() {
        let sp = flat_spectrum(true);
        let res = integrate_windows(&sp, &[(1200.0, 1400.0)], false, None).unwrap();
        // 常数 2，宽度 200
        assert!((res[0].integral - 400.0).abs() < 1e-9);
        assert!(res[0].normalized.is_none());
    }

    #[test]
    fn test_descending_axis_same_sign() {
        let asc = flat_spectrum(true);
        let des = flat_spectrum(false);
        let a = integrate_windows(&asc, &[(1200.0, 1400.0)], false, None).unwrap();
        let d = integrate_windows(&des, &[(1200.0, 1400.0)], false, None).unwrap();
        assert!((a[0].integral - d[0].integral).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_removes_linear_trend() {
        // y = 0.01·x 的纯线性谱，基线扣除后积分应为零
        let x: Vec<f64> = (0..=50).map(|i| 1000.0 + 4.0 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 0.01 * v).collect();
        let sp = Spectrum::new(x, y);
        let res = integrate_windows(&sp, &[(1000.0, 1200.0)], true, None).unwrap();
        assert!(res[0].integral.abs() < 1e-9);
    }

    #[test]
    fn test_mass_normalization() {
        let sp = flat_spectrum(true);
        let res = integrate_windows(&sp, &[(1200.0, 1400.0)], false, Some(4.0)).unwrap();
        assert!((res[0].normalized.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_outside_range_is_error() {
        let sp = flat_spectrum(true);
        assert!(integrate_windows(&sp, &[(4000.0, 4500.0)], false, None).is_err());
    }

    #[test]
    fn test_parse_windows() {
        let w = parse_windows("1000-1200, 2800-3000").unwrap();
        assert_eq!(w, vec![(1000.0, 1200.0), (2800.0, 3000.0)]);
        assert!(parse_windows("1200-1000").is_err());
        assert!(parse_windows("").is_err());
        assert!(parse_windows("abc").is_err());
    }
}
