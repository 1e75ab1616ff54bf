//! # Micromeritics Tristar II 报告解析器
//!
//! 解析 Tristar 导出的文本报告，提取汇总值、吸附-脱附
//! 等温线和各 BJH 表格。
//!
//! ## 报告结构
//! 报告首部是带单位的单值条目（"BET surface area: ... m²/g"），
//! 其后是若干两列数值表格，每个表格由标题行和单位行引导。
//! 不同固件版本的表头拼写略有差异（Pore Width / Pore Diameter），
//! 小数分隔符可能是逗号。
//!
//! ## 依赖关系
//! - 被 `commands/adsorption/` 使用
//! - 使用 `models/isotherm.rs`
//! - 使用 `regex` 定位表格

use crate::error::Result;
use crate::models::{Isotherm, SummaryValue};
use regex::Regex;
use std::path::Path;

/// 汇总条目的检索标签（与报告行首文本匹配，大小写不敏感）
pub const SUMMARY_LABELS: &[&str] = &[
    "BET surface area",
    "BJH Adsorption cumulative surface area of pores",
    "BJH Desorption cumulative surface area of pores",
    "BJH Adsorption cumulative volume of pores",
    "BJH Desorption cumulative volume of pores",
    "BJH Adsorption average pore",
    "BJH Desorption average pore",
    "Sample Mass",
];

/// 报告中的一张两列表格及其列描述
#[derive(Debug, Clone)]
pub struct ReportTable {
    /// 表格标题，如 "BJH dV/dlog(w) Desorption Pore Volume"
    pub title: String,
    /// x 列名称
    pub x_name: String,
    /// x 列单位
    pub x_unit: String,
    /// y 列名称
    pub y_name: String,
    /// y 列单位
    pub y_unit: String,
    /// 数据点
    pub points: Vec<(f64, f64)>,
}

/// 已解码的 Tristar 报告
#[derive(Debug, Clone)]
pub struct TristarReport {
    /// 样品名（文件名去扩展名）
    pub sample: String,
    text: String,
}

/// 从路径取样品名
pub fn sample_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sample")
        .to_string()
}

/// 读取并解码一份报告
pub fn parse_report(path: &Path) -> Result<TristarReport> {
    let text = super::read_text_auto(path)?;
    Ok(TristarReport {
        sample: sample_name(path),
        text,
    })
}

impl TristarReport {
    /// 直接从字符串构造（测试用）
    pub fn from_text(sample: impl Into<String>, text: impl Into<String>) -> Self {
        TristarReport {
            sample: sample.into(),
            text: text.into(),
        }
    }

    /// 提取一个汇总值；未找到时 value 为 None
    pub fn summary_value(&self, label: &str) -> SummaryValue {
        // 标签与冒号之间可以隔着说明文字和换行
        let pattern = format!(
            r"(?is){}[\w\s.,()/]{{0,120}}?:\s+(\d+(?:[.,]\d+)?(?:[eE][+-]?\d+)?)\s*,?\s+([\w/²³·°%]+)",
            regex::escape(label)
        );

        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(_) => return SummaryValue::new(label, "", None),
        };

        match re.captures(&self.text) {
            Some(caps) => {
                let value = parse_number(caps.get(1).map(|m| m.as_str()).unwrap_or(""));
                let unit = caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string();
                SummaryValue::new(label, unit, value)
            }
            None => SummaryValue::new(label, "", None),
        }
    }

    /// 提取全部汇总条目
    pub fn summary(&self) -> Vec<SummaryValue> {
        SUMMARY_LABELS
            .iter()
            .map(|label| self.summary_value(label))
            .collect()
    }

    /// 按表头正则定位两列表格；未找到返回空表
    pub fn table(&self, header_pattern: &str) -> Vec<(f64, f64)> {
        let re = match Regex::new(header_pattern) {
            Ok(re) => re,
            Err(_) => return Vec::new(),
        };

        let start = match re.find(&self.text) {
            Some(m) => m.end(),
            None => return Vec::new(),
        };

        collect_pairs(&self.text[start..])
    }

    /// 提取等温线分支（"Adsorption" 或 "Desorption"）
    pub fn isotherm_branch(&self, branch: &str) -> Vec<(f64, f64)> {
        let pattern = format!(r"(?is)-\s+{}\s+Relative\s+Pressure", branch);
        self.table(&pattern)
    }

    /// 提取并组装吸附-脱附等温线
    pub fn isotherm(&self) -> Isotherm {
        let ads = self.isotherm_branch("Adsorption");
        let des = self.isotherm_branch("Desorption");
        Isotherm::assemble(ads, des)
    }

    /// 提取 parse 命令导出的全部 BJH 表格
    ///
    /// 表格缺失时对应 points 为空，由调用方决定告警。
    pub fn bjh_tables(&self) -> Vec<ReportTable> {
        let specs: &[(&str, &str, &str)] = &[
            (
                "BJH dV/dlog(w) Desorption Pore Volume",
                r"(?is)BJH\s+Desorption\s+dV/dlog",
                "dV/dlog(w)",
            ),
            (
                "BJH dV/dlog(w) Adsorption Pore Volume",
                r"(?is)BJH\s+Adsorption\s+dV/dlog",
                "dV/dlog(w)",
            ),
            (
                "BJH Desorption Cumulative Pore Volume",
                r"(?is)BJH\s+Desorption\s+Cumulative.{0,200}?Pore\s+Volume",
                "cm³/g",
            ),
            (
                "BJH Adsorption Cumulative Pore Volume",
                r"(?is)BJH\s+Adsorption\s+Cumulative.{0,200}?Pore\s+Volume",
                "cm³/g",
            ),
            (
                "BJH dA/dlog(w) Desorption Pore Area",
                r"(?is)BJH\s+Desorption\s+dA/dlog",
                "dA/dlog(w)",
            ),
            (
                "BJH dA/dlog(w) Adsorption Pore Area",
                r"(?is)BJH\s+Adsorption\s+dA/dlog",
                "dA/dlog(w)",
            ),
            (
                "BJH Desorption Cumulative Pore Area",
                r"(?is)BJH\s+Desorption\s+Cumulative.{0,200}?Pore\s+Area",
                "m²/g",
            ),
            (
                "BJH Adsorption Cumulative Pore Area",
                r"(?is)BJH\s+Adsorption\s+Cumulative.{0,200}?Pore\s+Area",
                "m²/g",
            ),
        ];

        specs
            .iter()
            .map(|(title, pattern, y_unit)| {
                let is_area = title.contains("Area");
                ReportTable {
                    title: title.to_string(),
                    x_name: "Pore Width".to_string(),
                    x_unit: "nm".to_string(),
                    y_name: if is_area {
                        "Pore Area".to_string()
                    } else {
                        "Pore Volume".to_string()
                    },
                    y_unit: y_unit.to_string(),
                    points: self.table(pattern),
                }
            })
            .collect()
    }
}

/// 从表头之后的文本逐行收集数值对
///
/// 表头与数据之间允许夹杂单位行和空行（无数字的行）；
/// 数据开始后遇到非数值对的非空行即认为表格结束。
fn collect_pairs(text: &str) -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    let mut started = false;
    let mut skipped = 0usize;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(pair) = parse_pair(trimmed) {
            points.push(pair);
            started = true;
            continue;
        }

        if started {
            if trimmed.is_empty() {
                continue;
            }
            break;
        }

        // 数据尚未开始：跳过表头残余（单位行等），但不跳过
        // 含数字的行，它们属于别的内容
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            break;
        }
        skipped += 1;
        if skipped > 10 {
            break;
        }
    }

    points
}

/// 解析一行恰好两个数值的情况
fn parse_pair(line: &str) -> Option<(f64, f64)> {
    let mut tokens = line.split_whitespace();
    let a = parse_number(tokens.next()?)?;
    let b = parse_number(tokens.next()?)?;
    if tokens.next().is_some() {
        return None;
    }
    Some((a, b))
}

/// 解析单个数值，容忍小数逗号（"1,2345" → 1.2345）
pub fn parse_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.contains(',') && !token.contains('.') {
        token.replace(',', ".").parse().ok()
    } else {
        token.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_REPORT: &str = r#"
Summary Report

BET surface area:  245.1234 m²/g
BJH Desorption cumulative volume of pores
    between 1.7000 nm and 300.0000 nm width:  0.612345 cm³/g
Sample Mass:  0.1234 g

Isotherm Tabular Report

- Adsorption
Relative Pressure (p/p°)   Quantity Adsorbed (cm³/g STP)
0.010203   12.3456
0.100000   45.6789
0.300000   67.8901
0.950000   180.1234

- Desorption
Relative Pressure (p/p°)   Quantity Adsorbed (cm³/g STP)
0.960000   182.0000
0.500000   120.0000
0.200000   55.0000

BJH Desorption dV/dlog(w) Pore Volume
Pore Width (nm)   Pore Volume (cm³/g·nm)
2.5321   0.012345
10.1234   0.234561
50.0000   0.001234
"#;

    #[test]
    fn test_summary_value() {
        let report = TristarReport::from_text("test", SAMPLE_REPORT);

        let bet = report.summary_value("BET surface area");
        assert_eq!(bet.value, Some(245.1234));
        assert_eq!(bet.unit, "m²/g");

        let mass = report.summary_value("Sample Mass");
        assert_eq!(mass.value, Some(0.1234));
        assert_eq!(mass.unit, "g");
    }

    #[test]
    fn test_summary_label_spans_lines() {
        let report = TristarReport::from_text("test", SAMPLE_REPORT);
        let vol = report.summary_value("BJH Desorption cumulative volume of pores");
        assert_eq!(vol.value, Some(0.612345));
        assert_eq!(vol.unit, "cm³/g");
    }

    #[test]
    fn test_missing_summary_value() {
        let report = TristarReport::from_text("test", SAMPLE_REPORT);
        let missing = report.summary_value("BJH Adsorption average pore");
        assert!(missing.value.is_none());
    }

    #[test]
    fn test_isotherm_branches() {
        let report = TristarReport::from_text("test", SAMPLE_REPORT);

        let ads = report.isotherm_branch("Adsorption");
        assert_eq!(ads.len(), 4);
        assert!((ads[0].0 - 0.010203).abs() < 1e-9);
        assert!((ads[3].1 - 180.1234).abs() < 1e-9);

        let des = report.isotherm_branch("Desorption");
        assert_eq!(des.len(), 3);
    }

    #[test]
    fn test_isotherm_assembled() {
        let report = TristarReport::from_text("test", SAMPLE_REPORT);
        let iso = report.isotherm();

        // 全局最大压力在脱附支 (0.96)
        assert_eq!(iso.adsorption.last().unwrap().0, 0.96);
        assert_eq!(iso.desorption.first().unwrap().0, 0.96);
    }

    #[test]
    fn test_bjh_table() {
        let report = TristarReport::from_text("test", SAMPLE_REPORT);
        let tables = report.bjh_tables();

        let dvdlogw = tables
            .iter()
            .find(|t| t.title == "BJH dV/dlog(w) Desorption Pore Volume")
            .unwrap();
        assert_eq!(dvdlogw.points.len(), 3);
        assert!((dvdlogw.points[1].1 - 0.234561).abs() < 1e-9);

        // 报告中不存在的表格返回空
        let missing = tables
            .iter()
            .find(|t| t.title == "BJH Adsorption Cumulative Pore Area")
            .unwrap();
        assert!(missing.points.is_empty());
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_number("1,2345"), Some(1.2345));
        assert_eq!(parse_number("1.2345"), Some(1.2345));
        assert_eq!(parse_number("1.23e-05"), Some(1.23e-5));
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_table_with_comma_decimals() {
        let text = "\n- Adsorption\nRelative Pressure (p/p°)\n0,1000   12,5000\n0,2000   25,0000\n";
        let report = TristarReport::from_text("t", text);
        let ads = report.isotherm_branch("Adsorption");
        assert_eq!(ads.len(), 2);
        assert!((ads[1].1 - 25.0).abs() < 1e-9);
    }
}
