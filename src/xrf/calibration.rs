//! # XRF 校准曲线存取
//!
//! 校准曲线以 JSON 保存，文件名 `<元素>_calib_<标签>.json`，
//! 标签默认为校准日期 (YYYYMMDD)。每个元素的每个峰单独
//! 存一条直线拟合（斜率、截距及其误差、r²）和拟合用的原始
//! 数据点，便于之后复查。
//!
//! 读取时先找标签完全一致的文件，找不到则取标签前缀匹配中
//! 修改时间最新的一个。
//!
//! ## 依赖关系
//! - 被 `commands/xrf/calibrate.rs` 写入
//! - 被 `commands/xrf/analyze.rs` 读取
//! - 使用 `serde` / `serde_json` 序列化

use crate::error::{LabError, Result};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 单个峰的校准直线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakCalibration {
    /// 峰积分区间 (keV)
    pub peak: (f64, f64),
    pub intercept: f64,
    #[serde(rename = "intercept err")]
    pub intercept_err: f64,
    pub slope: f64,
    #[serde(rename = "slope err")]
    pub slope_err: f64,
    pub r2: f64,
    /// 校准样品的元素含量 (percent)
    #[serde(rename = "x perc")]
    pub x_perc: Vec<f64>,
    /// µmol 到 percent 的换算系数
    #[serde(rename = "umol to perc")]
    pub umol_to_perc: f64,
    /// 归一化峰面积
    #[serde(rename = "y peak area")]
    pub y_peak_area: Vec<f64>,
    #[serde(rename = "y peak area err")]
    pub y_peak_area_err: Vec<f64>,
    /// 校准样品粉末质量 (mg)
    #[serde(rename = "calib weights")]
    pub calib_weights: Vec<f64>,
}

/// 一个元素的完整校准：每个峰一条
#[derive(Debug, Clone)]
pub struct ElementCalibration {
    pub element: String,
    pub peaks: Vec<PeakCalibration>,
}

impl ElementCalibration {
    /// 保存到 `<dir>/<元素>_calib_<标签>.json`
    pub fn save(&self, dir: &Path, label: &str) -> Result<PathBuf> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| LabError::FileWriteError {
                path: dir.display().to_string(),
                source: e,
            })?;
        }

        let path = dir.join(format!("{}_calib_{}.json", self.element, label));
        let mut doc: HashMap<String, &Vec<PeakCalibration>> = HashMap::new();
        doc.insert(self.element.clone(), &self.peaks);
        let json = serde_json::to_string_pretty(&doc)?;
        fs::write(&path, json).map_err(|e| LabError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(path)
    }

    /// 从指定文件读取
    pub fn load(path: &Path, element: &str) -> Result<ElementCalibration> {
        let text = fs::read_to_string(path).map_err(|e| LabError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        let doc: HashMap<String, Vec<PeakCalibration>> = serde_json::from_str(&text)?;
        let peaks = doc.get(element).cloned().ok_or_else(|| {
            LabError::ParseError {
                format: "calibration JSON".to_string(),
                path: path.display().to_string(),
                reason: format!("no entry for element {}", element),
            }
        })?;
        Ok(ElementCalibration {
            element: element.to_string(),
            peaks,
        })
    }

    /// 在目录中查找元素的校准文件并读取
    ///
    /// 先找 `<元素>_calib_<标签>.json`，否则取标签前缀匹配的
    /// 文件中修改时间最新者。
    pub fn find_and_load(dir: &Path, element: &str, label: &str) -> Result<ElementCalibration> {
        let path = find_calibration_file(dir, element, label)?;
        ElementCalibration::load(&path, element)
    }
}

/// 查找校准文件，返回路径
pub fn find_calibration_file(dir: &Path, element: &str, label: &str) -> Result<PathBuf> {
    let exact = dir.join(format!("{}_calib_{}.json", element, label));
    if exact.is_file() {
        return Ok(exact);
    }

    let prefix = format!("{}_calib_{}", element, label);
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    if dir.is_dir() {
        let entries = fs::read_dir(dir).map_err(|e| LabError::FileReadError {
            path: dir.display().to_string(),
            source: e,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => continue,
            };
            if !name.starts_with(&prefix) || !name.ends_with(".json") {
                continue;
            }
            let mtime = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            match &newest {
                Some((t, _)) if *t >= mtime => {}
                _ => newest = Some((mtime, path)),
            }
        }
    }

    newest
        .map(|(_, p)| p)
        .ok_or_else(|| LabError::CalibrationNotFound {
            element: element.to_string(),
            label: label.to_string(),
            path: dir.display().to_string(),
        })
}

/// 列出目录下所有校准文件名
pub fn list_calibration_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    if dir.is_dir() {
        let entries = fs::read_dir(dir).map_err(|e| LabError::FileReadError {
            path: dir.display().to_string(),
            source: e,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.contains("_calib_") && name.ends_with(".json") {
                    names.push(name.to_string());
                }
            }
        }
    }
    names.sort();
    Ok(names)
}
