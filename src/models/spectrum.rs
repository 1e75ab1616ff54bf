//! # 光谱数据模型
//!
//! 定义单条光谱和 XRF 光谱集合。
//!
//! ## XRF 光谱排布
//! Olympus Delta 导出的 CSV 中，每个样品依次占
//! `repeats × num_beams` 列：每次重复测量内按波束序排列。
//! 文件开头可含一条仪器自校准谱（解析时丢弃）。
//!
//! ## 依赖关系
//! - 被 `parsers/xrf_csv.rs`, `parsers/ftir_csv.rs` 构造
//! - 被 `xrf/peaks.rs`, `ftir/` 使用

use crate::error::{LabError, Result};

/// 单条光谱，x 轴与信号等长
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    /// x 轴（keV 或 cm⁻¹）
    pub x: Vec<f64>,
    /// 信号（counts/s 或吸光度）
    pub y: Vec<f64>,
}

impl Spectrum {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Spectrum { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 截取 x ∈ [lo, hi] 的窗口
    pub fn window(&self, lo: f64, hi: f64) -> Spectrum {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..self.len() {
            if self.x[i] >= lo && self.x[i] <= hi {
                x.push(self.x[i]);
                y.push(self.y[i]);
            }
        }
        Spectrum { x, y }
    }

    /// x 轴覆盖范围 (min, max)
    pub fn x_range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in &self.x {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        Some((lo, hi))
    }
}

/// 解析后的 XRF 光谱集合
///
/// 所有谱共享能量轴，计数已按曝光时间归一为 counts/s。
#[derive(Debug, Clone)]
pub struct XrfSpectraSet {
    /// 能量轴 (keV)
    pub energies: Vec<f64>,
    /// 每列一条谱（仪器自校准谱已剔除）
    pub spectra: Vec<Vec<f64>>,
    /// 每列的波束编号（ExposureNum 行）
    pub beam_ids: Vec<u32>,
    /// 每个样品的重复测量次数
    pub repeats: usize,
    /// 每次重复测量的波束数
    pub num_beams: usize,
}

impl XrfSpectraSet {
    /// 文件中的样品数（含作为背景的空支架）
    pub fn num_samples(&self) -> usize {
        if self.repeats == 0 || self.num_beams == 0 {
            return 0;
        }
        self.spectra.len() / (self.repeats * self.num_beams)
    }

    /// 集合中出现的波束编号（去重，升序）
    pub fn beams(&self) -> Vec<u32> {
        let mut beams: Vec<u32> = self.beam_ids.clone();
        beams.sort_unstable();
        beams.dedup();
        beams
    }

    /// 取第 sample 个样品第 repeat 次重复的第 beam 波束谱
    ///
    /// 三个下标均从零开始。
    pub fn spectrum(&self, sample: usize, repeat: usize, beam: usize) -> Result<Spectrum> {
        if repeat >= self.repeats || beam >= self.num_beams {
            return Err(LabError::InvalidArgument(format!(
                "spectrum index out of layout: repeat {} beam {} (layout {}x{})",
                repeat, beam, self.repeats, self.num_beams
            )));
        }

        let col = sample * self.repeats * self.num_beams + repeat * self.num_beams + beam;
        let counts = self.spectra.get(col).ok_or_else(|| {
            LabError::InvalidArgument(format!(
                "spectrum column {} out of range ({} columns)",
                col,
                self.spectra.len()
            ))
        })?;

        Ok(Spectrum::new(self.energies.clone(), counts.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_set(num_samples: usize, repeats: usize, num_beams: usize) -> XrfSpectraSet {
        let cols = num_samples * repeats * num_beams;
        // 每列填充列号，便于校验排布
        let spectra: Vec<Vec<f64>> = (0..cols).map(|c| vec![c as f64; 4]).collect();
        XrfSpectraSet {
            energies: vec![0.0, 1.0, 2.0, 3.0],
            beam_ids: (0..cols).map(|c| (c % num_beams) as u32 + 1).collect(),
            spectra,
            repeats,
            num_beams,
        }
    }

    #[test]
    fn test_column_layout() {
        let set = make_set(2, 3, 3);
        assert_eq!(set.num_samples(), 2);

        // 样品 1, 重复 1, 波束 2 → 列 1*9 + 1*3 + 2 = 14
        let sp = set.spectrum(1, 1, 2).unwrap();
        assert_eq!(sp.y[0], 14.0);
    }

    #[test]
    fn test_beams_unique() {
        let set = make_set(1, 2, 3);
        assert_eq!(set.beams(), vec![1, 2, 3]);
    }

    #[test]
    fn test_out_of_layout() {
        let set = make_set(1, 3, 3);
        assert!(set.spectrum(0, 3, 0).is_err());
        assert!(set.spectrum(5, 0, 0).is_err());
    }

    #[test]
    fn test_spectrum_window() {
        let sp = Spectrum::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0, 9.0]);
        let w = sp.window(1.0, 3.0);
        assert_eq!(w.x, vec![1.0, 2.0, 3.0]);
        assert_eq!(w.y, vec![6.0, 7.0, 8.0]);
    }
}
