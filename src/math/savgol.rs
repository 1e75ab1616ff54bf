//! # Savitzky-Golay 平滑滤波
//!
//! 对等间隔光谱做二次多项式滑动窗口平滑，等价于
//! scipy.signal.savgol_filter(polyorder=2) 的行为。
//!
//! ## 算法
//! 对每个点取以其为中心的窗口，在窗口内用正规方程拟合
//! 二次多项式，平滑值为多项式在该点处的值。边界处窗口
//! 向内收缩，退化为单侧拟合。
//!
//! ## 依赖关系
//! - 被 `xrf/peaks.rs` 调用
//! - 使用 `math/mod.rs` 的 solve_linear_system

use super::solve_linear_system;

/// Savitzky-Golay 平滑（二次多项式）
///
/// `window` 必须为奇数且 >= 5，否则返回输入的拷贝。
pub fn savgol_smooth(y: &[f64], window: usize) -> Vec<f64> {
    let n = y.len();
    if window < 5 || window % 2 == 0 || n < window {
        return y.to_vec();
    }

    let half = window / 2;
    let mut smoothed = Vec::with_capacity(n);

    for i in 0..n {
        let lo = i.saturating_sub(half);
        let hi = (i + half + 1).min(n);

        if hi - lo < 3 {
            smoothed.push(y[i]);
            continue;
        }

        match fit_quadratic_at(&y[lo..hi], i - lo) {
            Some(v) => smoothed.push(v),
            None => smoothed.push(y[i]),
        }
    }

    smoothed
}

/// 在窗口内拟合二次多项式并返回 offset 处的值
///
/// 坐标取窗口内相对于 offset 的整数偏移，拟合值即常数项。
fn fit_quadratic_at(window: &[f64], offset: usize) -> Option<f64> {
    // 正规方程 AᵀA·a = Aᵀy，A 的行为 [1, j, j²]
    let mut s = [0.0f64; 5]; // Σj⁰ .. Σj⁴
    let mut t = [0.0f64; 3]; // Σy·j⁰ .. Σy·j²

    for (k, &yv) in window.iter().enumerate() {
        let j = k as f64 - offset as f64;
        let j2 = j * j;
        s[0] += 1.0;
        s[1] += j;
        s[2] += j2;
        s[3] += j2 * j;
        s[4] += j2 * j2;
        t[0] += yv;
        t[1] += yv * j;
        t[2] += yv * j2;
    }

    let mut a = vec![
        vec![s[0], s[1], s[2]],
        vec![s[1], s[2], s[3]],
        vec![s[2], s[3], s[4]],
    ];
    let mut b = vec![t[0], t[1], t[2]];

    solve_linear_system(&mut a, &mut b).map(|coef| coef[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_preserved() {
        // 二次信号应被二次 SG 滤波精确保留
        let y: Vec<f64> = (0..50)
            .map(|i| {
                let x = i as f64;
                0.5 * x * x - 3.0 * x + 7.0
            })
            .collect();

        let smoothed = savgol_smooth(&y, 9);
        for (a, b) in y.iter().zip(smoothed.iter()) {
            assert!((a - b).abs() < 1e-6, "expected {} got {}", a, b);
        }
    }

    #[test]
    fn test_constant_preserved() {
        let y = vec![4.2; 30];
        let smoothed = savgol_smooth(&y, 7);
        for v in smoothed {
            assert!((v - 4.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_noise_reduced() {
        // 交替噪声叠加在常数上，平滑后方差应显著下降
        let y: Vec<f64> = (0..100)
            .map(|i| 10.0 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();

        let smoothed = savgol_smooth(&y, 11);
        let noise_in: f64 = y.iter().map(|v| (v - 10.0).powi(2)).sum();
        let noise_out: f64 = smoothed.iter().map(|v| (v - 10.0).powi(2)).sum();
        assert!(noise_out < noise_in * 0.5);
    }

    #[test]
    fn test_even_window_returns_input() {
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let smoothed = savgol_smooth(&y, 4);
        assert_eq!(smoothed, y);
    }
}
