//! # CSV 报告输出
//!
//! 列式报告：每列依次为标题行、单位行、样品名行和数值，
//! 各列长度可以不同。批处理汇总为行式：标题行、单位行、
//! 每个样品一行。
//!
//! ## 依赖关系
//! - 被 `commands/` 各子命令调用
//! - 使用 `csv` 序列化

use crate::error::{LabError, Result};

use std::fs::File;
use std::io;
use std::path::Path;

/// 报告中的一列数据
#[derive(Debug, Clone)]
pub struct ReportColumn {
    /// 列标题，如 "Cumulative Pore Volume"
    pub title: String,
    /// 单位，如 "cm³/g"
    pub unit: String,
    /// 样品名
    pub sample: String,
    /// 数值
    pub values: Vec<f64>,
}

impl ReportColumn {
    pub fn new(title: &str, unit: &str, sample: &str, values: Vec<f64>) -> Self {
        ReportColumn {
            title: title.to_string(),
            unit: unit.to_string(),
            sample: sample.to_string(),
            values,
        }
    }
}

/// 将列式报告写入任意输出流
pub fn write_columns<W: io::Write>(writer: W, columns: &[ReportColumn]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let header: Vec<&str> = columns.iter().map(|c| c.title.as_str()).collect();
    wtr.write_record(&header)?;
    let units: Vec<&str> = columns.iter().map(|c| c.unit.as_str()).collect();
    wtr.write_record(&units)?;
    let samples: Vec<&str> = columns.iter().map(|c| c.sample.as_str()).collect();
    wtr.write_record(&samples)?;

    let max_len = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
    for row in 0..max_len {
        let record: Vec<String> = columns
            .iter()
            .map(|c| {
                c.values
                    .get(row)
                    .map(|v| format_value(*v))
                    .unwrap_or_default()
            })
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|e| LabError::Other(e.to_string()))?;
    Ok(())
}

/// 将列式报告写入文件
pub fn write_columns_to_file(path: &Path, columns: &[ReportColumn]) -> Result<()> {
    let file = File::create(path).map_err(|e| LabError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    write_columns(file, columns)
}

/// 批处理汇总：标题行、单位行，之后每个样品一行
pub fn write_summary<W: io::Write>(
    writer: W,
    titles: &[String],
    units: &[String],
    rows: &[(String, Vec<Option<f64>>)],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["Sample".to_string()];
    header.extend(titles.iter().cloned());
    wtr.write_record(&header)?;

    let mut unit_row = vec![String::new()];
    unit_row.extend(units.iter().cloned());
    wtr.write_record(&unit_row)?;

    for (sample, values) in rows {
        let mut record = vec![sample.clone()];
        record.extend(
            values
                .iter()
                .map(|v| v.map(format_value).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|e| LabError::Other(e.to_string()))?;
    Ok(())
}

/// 批处理汇总写入文件
pub fn write_summary_to_file(
    path: &Path,
    titles: &[String],
    units: &[String],
    rows: &[(String, Vec<Option<f64>>)],
) -> Result<()> {
    let file = File::create(path).map_err(|e| LabError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    write_summary(file, titles, units, rows)
}

/// 数值格式化：保留足够有效位，避免科学计数的冗长尾零
fn format_value(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let abs = v.abs();
    if abs >= 1e6 || abs < 1e-4 {
        format!("{:e}", v)
    } else {
        let s = format!("{:.6}", v);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_columns_ragged() {
        let columns = vec![
            ReportColumn::new("Pore Width", "nm", "s1", vec![1.0, 2.0, 3.0]),
            ReportColumn::new("BET surface area", "m²/g", "s1", vec![123.456]),
        ];

        let mut buf = Vec::new();
        write_columns(&mut buf, &columns).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Pore Width,BET surface area");
        assert_eq!(lines[1], "nm,m²/g");
        assert_eq!(lines[2], "s1,s1");
        assert_eq!(lines[3], "1,123.456");
        // 短列补空
        assert_eq!(lines[4], "2,");
        assert_eq!(lines[5], "3,");
    }

    #[test]
    fn test_write_summary() {
        let titles = vec!["BET surface area".to_string()];
        let units = vec!["m²/g".to_string()];
        let rows = vec![
            ("sample_a".to_string(), vec![Some(250.5)]),
            ("sample_b".to_string(), vec![None]),
        ];

        let mut buf = Vec::new();
        write_summary(&mut buf, &titles, &units, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Sample,BET surface area");
        assert_eq!(lines[1], ",m²/g");
        assert_eq!(lines[2], "sample_a,250.5");
        assert_eq!(lines[3], "sample_b,");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(1.5), "1.5");
        assert_eq!(format_value(123.456789), "123.456789");
        assert!(format_value(1.0e-7).contains('e'));
    }
}
