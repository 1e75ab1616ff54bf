//! # FTIR 光谱 CSV 解析器
//!
//! 读取两列（波数 cm⁻¹，吸光度）的 CSV 光谱。首行若非数值
//! 则视为表头跳过；波数可以升序或降序。
//!
//! ## 依赖关系
//! - 被 `commands/ftir.rs` 使用
//! - 使用 `models/spectrum.rs` 的 Spectrum
//! - 使用 `csv` 读取、`parsers/mod.rs` 解码

use crate::error::{LabError, Result};
use crate::models::Spectrum;
use std::path::Path;

/// 解析 FTIR 光谱文件
pub fn parse_ftir(path: &Path) -> Result<Spectrum> {
    let text = super::read_text_auto(path)?;
    parse_ftir_text(&text).map_err(|e| match e {
        LabError::Other(reason) => LabError::ParseError {
            format: "FTIR CSV".to_string(),
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 从已解码文本解析光谱
pub fn parse_ftir_text(text: &str) -> Result<Spectrum> {
    let delimiter = detect_delimiter(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut x = Vec::new();
    let mut y = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let fields: Vec<&str> = record.iter().map(|s| s.trim()).collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        if fields.len() < 2 {
            return Err(LabError::Other(format!(
                "line {}: expected two columns, got {}",
                idx + 1,
                fields.len()
            )));
        }

        let wn = super::tristar::parse_number(fields[0]);
        let ab = super::tristar::parse_number(fields[1]);

        match (wn, ab) {
            (Some(wn), Some(ab)) => {
                x.push(wn);
                y.push(ab);
            }
            // 首行表头容忍
            _ if idx == 0 => continue,
            _ => {
                return Err(LabError::Other(format!(
                    "line {}: non-numeric data '{}'",
                    idx + 1,
                    fields.join(", ")
                )))
            }
        }
    }

    if x.len() < 2 {
        return Err(LabError::Other(format!(
            "spectrum has only {} data points",
            x.len()
        )));
    }

    Ok(Spectrum::new(x, y))
}

fn detect_delimiter(text: &str) -> u8 {
    match text.lines().next() {
        Some(line) if line.contains('\t') => b'\t',
        Some(line) if line.contains(';') => b';',
        _ => b',',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header() {
        let text = "Wavenumber,Absorbance\n4000,0.01\n3999,0.02\n3998,0.015\n";
        let sp = parse_ftir_text(text).unwrap();
        assert_eq!(sp.len(), 3);
        assert_eq!(sp.x[0], 4000.0);
        assert!((sp.y[1] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_parse_without_header() {
        let text = "400.0,0.1\n401.0,0.2\n";
        let sp = parse_ftir_text(text).unwrap();
        assert_eq!(sp.len(), 2);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let text = "400.0;0.1\n401.0;0.2\n402.0;0.3\n";
        let sp = parse_ftir_text(text).unwrap();
        assert_eq!(sp.len(), 3);
    }

    #[test]
    fn test_non_numeric_rejected() {
        let text = "400.0,0.1\nbroken,line\n";
        assert!(parse_ftir_text(text).is_err());
    }

    #[test]
    fn test_too_short() {
        assert!(parse_ftir_text("4000,0.1\n").is_err());
    }
}
