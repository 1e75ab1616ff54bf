//! # XRF 峰积分
//!
//! 对单个元素计算峰积分：取该元素对应波束的谱，
//! Savitzky-Golay 平滑后在各积分区间内做高斯拟合，
//! 峰面积取拟合曲线在区间采样点上的逐点和；
//! 拟合失败时退回原始计数和。多次重复测量取均值与标准差，
//! 空支架本底按支架编号扣除，误差按方和根合成。
//!
//! ## 依赖关系
//! - 被 `commands/xrf/` 调用
//! - 使用 `models/spectrum.rs` 的 XrfSpectraSet
//! - 使用 `math/savgol.rs`, `math/gaussfit.rs`
//! - 使用 `xrf/elements.rs` 的 ElementData

use crate::error::{LabError, Result};
use crate::math::{fit_gaussian, savgol_smooth};
use crate::models::XrfSpectraSet;
use crate::xrf::ElementData;

/// 单个样品的峰积分结果，每个峰一个均值与标准差
#[derive(Debug, Clone)]
pub struct SampleIntegrals {
    pub avgs: Vec<f64>,
    pub stds: Vec<f64>,
}

/// 样品架分配方案
///
/// 谱文件开头是空支架的本底测量，其后为样品；
/// 每条谱（按样品序）对应一个支架编号，用于本底扣除。
#[derive(Debug, Clone)]
pub struct HolderPlan {
    /// 每个谱位置（含支架本身）对应的零基支架编号
    pub assignment: Vec<usize>,
    /// 不同支架的数量，同时是文件开头本底谱的数量
    pub num_holders: usize,
}

impl HolderPlan {
    /// 由用户给出的支架编号列表（1 基）构建完整分配
    ///
    /// 若给出的编号数少于谱数，则循环补齐。
    pub fn new(holder_ids: &[usize], num_spectra: usize) -> Result<HolderPlan> {
        if holder_ids.is_empty() {
            return Err(LabError::InvalidArgument(
                "holder list is empty".to_string(),
            ));
        }
        let mut assignment: Vec<usize> = Vec::with_capacity(num_spectra);
        for &id in holder_ids {
            if id == 0 {
                return Err(LabError::InvalidArgument(
                    "holder IDs are one-based, got 0".to_string(),
                ));
            }
            assignment.push(id - 1);
        }

        let mut distinct: Vec<usize> = assignment.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let num_holders = distinct.len();

        // 循环补齐到谱总数
        let mut idx = 0;
        while assignment.len() < num_spectra {
            assignment.push(assignment[idx]);
            idx += 1;
            if idx == num_holders {
                idx = 0;
            }
        }

        for &h in &assignment {
            if h >= num_holders {
                return Err(LabError::InvalidArgument(format!(
                    "holder ID {} exceeds the number of distinct holders {}",
                    h + 1,
                    num_holders
                )));
            }
        }

        Ok(HolderPlan {
            assignment,
            num_holders,
        })
    }

    /// 样品数（谱总数减去本底谱数）
    pub fn num_samples(&self) -> usize {
        self.assignment.len().saturating_sub(self.num_holders)
    }
}

/// 计算第 `sample` 个谱位置上某元素的峰积分
///
/// 返回每个峰在所有重复测量上的均值与标准差。
pub fn peak_integrals(
    set: &XrfSpectraSet,
    element: &ElementData,
    sample: usize,
) -> Result<SampleIntegrals> {
    let beam = element.beam as usize;
    if beam >= set.num_beams {
        return Err(LabError::InvalidArgument(format!(
            "no beam {} for element {} in spectra file ({} beams)",
            element.beam, element.symbol, set.num_beams
        )));
    }

    // repeat_ints[rep][peak]
    let mut repeat_ints: Vec<Vec<f64>> = Vec::with_capacity(set.repeats);
    for rep in 0..set.repeats {
        let spectrum = set.spectrum(sample, rep, beam)?;
        let smoothed = savgol_smooth(&spectrum.y, element.filter_window);

        let mut peak_ints = Vec::with_capacity(element.peaks.len());
        for &(lo, hi) in &element.peaks {
            let mut px = Vec::new();
            let mut py = Vec::new();
            for (i, &e) in set.energies.iter().enumerate() {
                if e >= lo && e <= hi {
                    px.push(e);
                    py.push(smoothed[i]);
                }
            }
            if px.is_empty() {
                return Err(LabError::InvalidArgument(format!(
                    "peak window {} .. {} keV is outside the energy axis",
                    lo, hi
                )));
            }

            // 高斯拟合失败时退回原始计数和
            let integral = match fit_gaussian(&px, &py) {
                Ok(fit) => px.iter().map(|&x| fit.evaluate(x)).sum(),
                Err(_) => py.iter().sum(),
            };
            peak_ints.push(integral);
        }
        repeat_ints.push(peak_ints);
    }

    let num_peaks = element.peaks.len();
    let n = repeat_ints.len() as f64;
    let mut avgs = vec![0.0; num_peaks];
    let mut stds = vec![0.0; num_peaks];
    for p in 0..num_peaks {
        let mean: f64 = repeat_ints.iter().map(|r| r[p]).sum::<f64>() / n;
        let var: f64 = repeat_ints
            .iter()
            .map(|r| (r[p] - mean) * (r[p] - mean))
            .sum::<f64>()
            / n;
        avgs[p] = mean;
        stds[p] = var.sqrt();
    }

    Ok(SampleIntegrals { avgs, stds })
}

/// 计算所有样品（不含本底谱）上某元素的峰积分
///
/// `plan` 给出支架分配；`subtract_background` 为真时
/// 先对每个支架计算本底峰积分，再从对应样品中扣除，
/// 误差按方和根合成。
pub fn element_integrals(
    set: &XrfSpectraSet,
    element: &ElementData,
    plan: &HolderPlan,
    subtract_background: bool,
) -> Result<Vec<SampleIntegrals>> {
    let num_spectra = set.num_samples();
    if plan.assignment.len() < num_spectra {
        return Err(LabError::InvalidArgument(format!(
            "holder plan covers {} spectra but file has {}",
            plan.assignment.len(),
            num_spectra
        )));
    }

    // 本底峰积分，按支架编号索引
    let mut backgrounds: Vec<SampleIntegrals> = Vec::new();
    if subtract_background {
        for h in 0..plan.num_holders {
            backgrounds.push(peak_integrals(set, element, h)?);
        }
    }

    let mut results = Vec::new();
    for sp in plan.num_holders..num_spectra {
        let mut ints = peak_integrals(set, element, sp)?;
        if subtract_background {
            let bg = &backgrounds[plan.assignment[sp]];
            for p in 0..ints.avgs.len() {
                ints.avgs[p] -= bg.avgs[p];
                ints.stds[p] =
                    (ints.stds[p] * ints.stds[p] + bg.stds[p] * bg.stds[p]).sqrt();
            }
        }
        results.push(ints);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xrf::lookup_element;

    /// 构造含高斯峰的光谱集合：支架本底 + 样品
    fn make_set(peak_amplitudes: &[f64], center: f64, repeats: usize) -> XrfSpectraSet {
        let num_points = 512;
        let energies: Vec<f64> = (0..num_points)
            .map(|i| 41.0 * i as f64 / (num_points - 1) as f64)
            .collect();
        let num_beams = 3;

        let mut spectra = Vec::new();
        let mut beam_ids = Vec::new();
        for &amp in peak_amplitudes {
            for _ in 0..repeats {
                for beam in 0..num_beams {
                    // 每个波束同样的峰形，简化测试
                    let y: Vec<f64> = energies
                        .iter()
                        .map(|&e| {
                            10.0 + amp * (-(e - center) * (e - center) / (2.0 * 0.09)).exp()
                        })
                        .collect();
                    spectra.push(y);
                    beam_ids.push(beam as u32 + 1);
                }
            }
        }

        XrfSpectraSet {
            energies,
            spectra,
            beam_ids,
            repeats,
            num_beams,
        }
    }

    #[test]
    fn test_holder_plan_augments_in_loop() {
        let plan = HolderPlan::new(&[1, 2], 7).unwrap();
        assert_eq!(plan.num_holders, 2);
        assert_eq!(plan.assignment, vec![0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(plan.num_samples(), 5);
    }

    #[test]
    fn test_holder_plan_explicit_assignment() {
        let plan = HolderPlan::new(&[1, 2, 1, 1, 2], 5).unwrap();
        assert_eq!(plan.num_holders, 2);
        assert_eq!(plan.assignment, vec![0, 1, 0, 0, 1]);
    }

    #[test]
    fn test_holder_plan_rejects_zero() {
        assert!(HolderPlan::new(&[0, 1], 4).is_err());
        assert!(HolderPlan::new(&[], 4).is_err());
    }

    #[test]
    fn test_peak_integral_scales_with_amplitude() {
        // Au 第一个峰窗口 9.4 .. 10 keV，峰置于 9.7 keV
        let set = make_set(&[100.0, 200.0], 9.7, 2);
        let au = lookup_element("Au").unwrap();

        let a = peak_integrals(&set, &au, 0).unwrap();
        let b = peak_integrals(&set, &au, 1).unwrap();

        assert!(a.avgs[0] > 0.0);
        assert!(b.avgs[0] > a.avgs[0]);
        // 重复测量完全相同，标准差应接近零
        assert!(a.stds[0].abs() < 1e-6 * a.avgs[0].abs().max(1.0));
    }

    #[test]
    fn test_background_subtraction() {
        // 谱 0 为支架本底，谱 1、2 为样品
        let set = make_set(&[50.0, 150.0, 250.0], 9.7, 2);
        let au = lookup_element("Au").unwrap();
        let plan = HolderPlan::new(&[1], 3).unwrap();

        let raw = element_integrals(&set, &au, &plan, false).unwrap();
        let sub = element_integrals(&set, &au, &plan, true).unwrap();

        assert_eq!(raw.len(), 2);
        assert_eq!(sub.len(), 2);
        // 扣除本底后面积变小且仍为正
        assert!(sub[0].avgs[0] < raw[0].avgs[0]);
        assert!(sub[0].avgs[0] > 0.0);
        // 两个样品峰高比 (150-50):(250-50) = 1:2
        let ratio = sub[1].avgs[0] / sub[0].avgs[0];
        assert!((ratio - 2.0).abs() < 0.1, "ratio {}", ratio);
    }

    #[test]
    fn test_missing_beam_is_error() {
        let mut set = make_set(&[100.0], 9.7, 1);
        set.num_beams = 1;
        set.spectra.truncate(1);
        set.beam_ids.truncate(1);
        let au = lookup_element("Au").unwrap();
        assert!(peak_integrals(&set, &au, 0).is_err());
    }
}
