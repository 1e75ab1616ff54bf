//! # 数值算法模块
//!
//! 提供工具箱内所有数据分析共用的数值算法。
//!
//! ## 子模块
//! - `linfit`: 最小二乘直线拟合（含参数误差）
//! - `savgol`: Savitzky-Golay 平滑滤波
//! - `gaussfit`: 高斯峰拟合（Gauss-Newton 迭代）
//!
//! ## 依赖关系
//! - 被 `adsorption/`, `xrf/`, `ftir/` 使用

pub mod gaussfit;
pub mod linfit;
pub mod savgol;

pub use gaussfit::{fit_gaussian, GaussianFit};
pub use linfit::{fit_line, fit_line_through_origin, LineFit};
pub use savgol::savgol_smooth;

/// 梯形法数值积分
///
/// x 可以是升序或降序，返回的积分值总是取正方向
/// （即按升序坐标的积分）。
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    let mut sum = 0.0;
    for i in 1..x.len().min(y.len()) {
        sum += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
    }
    // 降序坐标积分出负值，翻转符号
    if x.len() >= 2 && x[0] > x[x.len() - 1] {
        -sum
    } else {
        sum
    }
}

/// 高斯消元求解 n×n 线性方程组（带部分主元选取）
///
/// 解 A·x = b，矩阵以行为单位传入。奇异矩阵返回 None。
pub fn solve_linear_system(a: &mut [Vec<f64>], b: &mut [f64]) -> Option<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        // 选主元
        let mut pivot = col;
        for row in (col + 1)..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-14 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        // 消元
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    // 回代
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trapezoid_constant() {
        let x: Vec<f64> = (0..101).map(|i| i as f64).collect();
        let y = vec![2.0; 101];
        let integral = trapezoid(&x, &y);
        assert!((integral - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_trapezoid_descending_x() {
        let x: Vec<f64> = (0..101).map(|i| 100.0 - i as f64).collect();
        let y = vec![2.0; 101];
        let integral = trapezoid(&x, &y);
        assert!((integral - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_solve_linear_system_3x3() {
        let mut a = vec![
            vec![2.0, 1.0, -1.0],
            vec![-3.0, -1.0, 2.0],
            vec![-2.0, 1.0, 2.0],
        ];
        let mut b = vec![8.0, -11.0, -3.0];
        let x = solve_linear_system(&mut a, &mut b).unwrap();

        assert!((x[0] - 2.0).abs() < 1e-9);
        assert!((x[1] - 3.0).abs() < 1e-9);
        assert!((x[2] - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_solve_singular() {
        let mut a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let mut b = vec![1.0, 2.0];
        assert!(solve_linear_system(&mut a, &mut b).is_none());
    }
}
