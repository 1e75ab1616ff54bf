//! # 解析器模块
//!
//! 提供各种仪器导出文件的解析器和文本编码处理。
//!
//! 仪器软件输出的编码五花八门：新版 Tristar 导出 UTF-16-LE，
//! 旧版为 ANSI (Windows-1252)，Olympus Delta 的 CSV 可能是
//! UTF-8 或 UTF-16。此处统一做 BOM/启发式检测后解码。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: tristar, xrf_csv, ftir_csv

pub mod ftir_csv;
pub mod tristar;
pub mod xrf_csv;

use crate::error::{LabError, Result};
use std::fs;
use std::path::Path;

/// 读取文本文件并自动检测编码
///
/// 检测顺序：UTF-16-LE BOM → 零字节占比启发式（无 BOM 的
/// UTF-16-LE）→ UTF-8 → Latin-1 回退。
pub fn read_text_auto(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| LabError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(decode_text_auto(&bytes))
}

/// 按检测到的编码解码字节流
pub fn decode_text_auto(bytes: &[u8]) -> String {
    // UTF-16-LE BOM
    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        return decode_utf16_le(&bytes[2..]);
    }

    // 无 BOM 的 UTF-16-LE：ASCII 文本的奇数位字节大多为零
    if looks_like_utf16_le(bytes) {
        return decode_utf16_le(bytes);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1：每个字节直接映射到同码位
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// 将字符串编码为 UTF-16-LE 字节流（不带 BOM，与仪器输出一致）
pub fn encode_utf16_le(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// 解码 UTF-16-LE 字节流（无效代理对替换为 U+FFFD）
pub fn decode_utf16_le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// 零字节占比启发式：采样前 4 KiB，奇数位字节过半为零
/// 则判定为 UTF-16-LE
fn looks_like_utf16_le(bytes: &[u8]) -> bool {
    if bytes.len() < 4 || bytes.len() % 2 != 0 {
        return false;
    }

    let sample = &bytes[..bytes.len().min(4096)];
    let odd_zeros = sample
        .iter()
        .skip(1)
        .step_by(2)
        .filter(|&&b| b == 0)
        .count();

    odd_zeros * 2 > sample.len() / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_round_trip() {
        let text = "BET surface area: 123.4 m²/g\nSample Mass: 0.1234 g\n";
        let bytes = encode_utf16_le(text);
        assert_eq!(decode_text_auto(&bytes), text);
    }

    #[test]
    fn test_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(encode_utf16_le("hello"));
        assert_eq!(decode_text_auto(&bytes), "hello");
    }

    #[test]
    fn test_utf8_passthrough() {
        let text = "Relative Pressure (p/p°)";
        assert_eq!(decode_text_auto(text.as_bytes()), text);
    }

    #[test]
    fn test_latin1_fallback() {
        // 0xB0 在 Latin-1 中是度符号，不是合法 UTF-8 单字节
        let bytes = vec![b'2', b'5', 0xB0, b'C'];
        assert_eq!(decode_text_auto(&bytes), "25°C");
    }
}
