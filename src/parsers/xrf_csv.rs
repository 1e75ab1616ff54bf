//! # Olympus Delta XRF 光谱 CSV 解析器
//!
//! 解析仪器导出的光谱 CSV：第一列为行标题，其后每列一条谱。
//! 行 0 为 ExposureNum（波束编号），行 4 为谱通道数，行 7 为
//! 曝光时间（秒），末尾 `num_channels` 行为各通道计数。
//!
//! 能量轴为 0–41 keV 均匀分布；计数按曝光时间归一为 counts/s。
//! 文件开头通常有一条开机自校准谱，解析时按需丢弃。
//!
//! ## 依赖关系
//! - 被 `commands/xrf/` 使用
//! - 使用 `models/spectrum.rs` 的 XrfSpectraSet
//! - 使用 `csv` 读取、`parsers/mod.rs` 解码

use crate::error::{LabError, Result};
use crate::models::XrfSpectraSet;
use std::path::Path;

/// ExposureNum 所在行
const ROW_NUM_BEAMS: usize = 0;
/// 谱通道数所在行
const ROW_NUM_DATA: usize = 4;
/// 曝光时间所在行
const ROW_NUM_TIME: usize = 7;
/// 能量轴上限 (keV)
const ENERGY_MAX_KEV: f64 = 41.0;

/// 解析光谱 CSV 文件
pub fn parse_spectra(path: &Path, repeats: usize, skip_first: bool) -> Result<XrfSpectraSet> {
    let text = super::read_text_auto(path)?;
    parse_spectra_text(&text, repeats, skip_first).map_err(|e| match e {
        LabError::Other(reason) => LabError::ParseError {
            format: "XRF spectra CSV".to_string(),
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 从已解码文本解析光谱集合
pub fn parse_spectra_text(text: &str, repeats: usize, skip_first: bool) -> Result<XrfSpectraSet> {
    if repeats == 0 {
        return Err(LabError::InvalidArgument(
            "number of repeats must be positive".to_string(),
        ));
    }

    // 仪器有时用制表符、有时用逗号
    let delimiter = if text.lines().next().map(|l| l.contains('\t')).unwrap_or(false) {
        b'\t'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|s| s.trim().to_string()).collect());
    }

    if rows.len() <= ROW_NUM_TIME {
        return Err(LabError::Other(format!(
            "too few rows: {} (expected metadata rows plus channel data)",
            rows.len()
        )));
    }

    let num_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    // 第一列是行标题，之后才是谱数据
    let first_data_col = 1 + usize::from(skip_first);
    if num_cols <= first_data_col {
        return Err(LabError::Other(
            "no spectrum columns after the title column".to_string(),
        ));
    }

    let cell = |row: usize, col: usize| -> &str {
        rows.get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    };

    let num_channels: usize = cell(ROW_NUM_DATA, first_data_col).parse().map_err(|_| {
        LabError::Other(format!(
            "cannot read channel count from row {}",
            ROW_NUM_DATA
        ))
    })?;

    if rows.len() < num_channels {
        return Err(LabError::Other(format!(
            "file has {} rows but spectra declare {} channels",
            rows.len(),
            num_channels
        )));
    }

    let channel_row0 = rows.len() - num_channels;

    let mut spectra = Vec::new();
    let mut beam_ids = Vec::new();

    for col in first_data_col..num_cols {
        let beam: u32 = cell(ROW_NUM_BEAMS, col).parse().map_err(|_| {
            LabError::Other(format!("cannot read ExposureNum for column {}", col))
        })?;

        let exposure: f64 = cell(ROW_NUM_TIME, col).parse().map_err(|_| {
            LabError::Other(format!("cannot read exposure time for column {}", col))
        })?;
        if exposure <= 0.0 {
            return Err(LabError::Other(format!(
                "non-positive exposure time in column {}",
                col
            )));
        }

        let mut counts = Vec::with_capacity(num_channels);
        for row in channel_row0..rows.len() {
            let v: f64 = cell(row, col).parse().map_err(|_| {
                LabError::Other(format!(
                    "non-numeric channel value at row {} column {}",
                    row, col
                ))
            })?;
            counts.push(v / exposure);
        }

        beam_ids.push(beam);
        spectra.push(counts);
    }

    let num_beams = {
        let mut beams = beam_ids.clone();
        beams.sort_unstable();
        beams.dedup();
        beams.len()
    };

    if num_beams == 0 {
        return Err(LabError::Other("no beams found in spectra".to_string()));
    }

    if spectra.len() % (repeats * num_beams) != 0 {
        return Err(LabError::Other(format!(
            "{} spectrum columns do not divide into {} repeats x {} beams",
            spectra.len(),
            repeats,
            num_beams
        )));
    }

    let energies = (0..num_channels)
        .map(|i| ENERGY_MAX_KEV * i as f64 / (num_channels.max(2) - 1) as f64)
        .collect();

    Ok(XrfSpectraSet {
        energies,
        spectra,
        beam_ids,
        repeats,
        num_beams,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造一个最小的光谱 CSV：2 个样品 × 1 次重复 × 2 波束，
    /// 带自校准谱，4 个通道
    fn sample_csv() -> String {
        let mut lines = vec![
            // ExposureNum
            "ExposureNum\t1\t1\t2\t1\t2".to_string(),
            "Instrument\tDelta\tDelta\tDelta\tDelta\tDelta".to_string(),
            "Mode\tSoil\tSoil\tSoil\tSoil\tSoil".to_string(),
            "Date\tx\tx\tx\tx\tx".to_string(),
            // 通道数
            "DataPoints\t4\t4\t4\t4\t4".to_string(),
            "Unused1\t\t\t\t\t".to_string(),
            "Unused2\t\t\t\t\t".to_string(),
            // 曝光时间
            "Time\t10\t10\t10\t20\t20".to_string(),
        ];
        // 通道计数：每列都是列号 × 10
        for ch in 0..4 {
            let row: Vec<String> = (0..6)
                .map(|c| {
                    if c == 0 {
                        format!("ch{}", ch)
                    } else {
                        format!("{}", c * 10)
                    }
                })
                .collect();
            lines.push(row.join("\t"));
        }
        lines.join("\n")
    }

    #[test]
    fn test_parse_layout() {
        let set = parse_spectra_text(&sample_csv(), 1, true).unwrap();

        assert_eq!(set.num_beams, 2);
        assert_eq!(set.repeats, 1);
        assert_eq!(set.num_samples(), 2);
        assert_eq!(set.energies.len(), 4);
        assert!((set.energies[3] - 41.0).abs() < 1e-9);
    }

    #[test]
    fn test_counts_per_second() {
        let set = parse_spectra_text(&sample_csv(), 1, true).unwrap();

        // 跳过自校准谱后，第一条谱为原第 2 数据列（计数 20，曝光 10s）
        let sp = set.spectrum(0, 0, 0).unwrap();
        assert!((sp.y[0] - 2.0).abs() < 1e-9);

        // 样品 1 波束 1 为原第 5 数据列（计数 50，曝光 20s）
        let sp = set.spectrum(1, 0, 1).unwrap();
        assert!((sp.y[0] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_keep_first_spectrum_breaks_layout() {
        // 不丢弃自校准谱时列数为 5，无法整除 1×2 排布
        assert!(parse_spectra_text(&sample_csv(), 1, false).is_err());
    }

    #[test]
    fn test_comma_delimiter() {
        let csv = sample_csv().replace('\t', ",");
        let set = parse_spectra_text(&csv, 1, true).unwrap();
        assert_eq!(set.num_samples(), 2);
    }

    #[test]
    fn test_layout_mismatch() {
        // 3 条谱无法按 1 次重复 × 2 波束排布
        let mut csv = sample_csv();
        csv = csv
            .lines()
            .map(|l| {
                let mut parts: Vec<&str> = l.split('\t').collect();
                parts.pop();
                parts.join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(parse_spectra_text(&csv, 1, true).is_err());
    }
}
