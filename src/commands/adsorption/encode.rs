//! # adsorption encode 子命令实现
//!
//! 旧版 Tristar 软件以 ANSI 编码导出报告，新版解析流程
//! 期望 UTF-16-LE。此命令将 ANSI 报告原地转码为 UTF-16-LE，
//! 已是 UTF-16 的文件保持不动。
//!
//! ## 依赖关系
//! - 使用 `cli/adsorption.rs` 定义的 EncodeArgs
//! - 使用 `parsers/` 的编码检测与转换
//! - 使用 `batch/collector.rs` 收集文件

use crate::batch::FileCollector;
use crate::cli::adsorption::EncodeArgs;
use crate::error::{LabError, Result};
use crate::parsers;
use crate::utils::output;

use std::fs;
use std::path::Path;

/// 执行 encode 子命令
pub fn execute(args: EncodeArgs) -> Result<()> {
    output::print_header("Report Encoding Conversion");

    let files = FileCollector::new(&args.input)?
        .with_pattern(&args.pattern)?
        .collect()?;

    output::print_info(&format!("Found {} files", files.len()));

    if !args.overwrite {
        output::print_warning("Dry run: files are converted in place, pass --overwrite to apply");
    }

    let mut converted = 0usize;
    let mut skipped = 0usize;

    for file in &files {
        match convert_file(file, args.overwrite) {
            Ok(true) => {
                converted += 1;
                if args.overwrite {
                    output::print_success(&format!("Converted: {}", file.display()));
                } else {
                    output::print_info(&format!("Would convert: {}", file.display()));
                }
            }
            Ok(false) => {
                skipped += 1;
                output::print_skip(&format!("Already UTF-16-LE: {}", file.display()));
            }
            Err(e) => {
                output::print_error(&format!("{}: {}", file.display(), e));
            }
        }
    }

    output::print_separator();
    if args.overwrite {
        output::print_success(&format!(
            "{} converted, {} already UTF-16-LE",
            converted, skipped
        ));
    } else {
        output::print_info(&format!(
            "{} would be converted, {} already UTF-16-LE",
            converted, skipped
        ));
    }
    Ok(())
}

/// 转换单个文件，返回是否（将会）发生转换
fn convert_file(path: &Path, apply: bool) -> Result<bool> {
    let bytes = fs::read(path).map_err(|e| LabError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    if is_utf16_le(&bytes) {
        return Ok(false);
    }

    if apply {
        let text = parsers::decode_text_auto(&bytes);
        let encoded = parsers::encode_utf16_le(&text);
        fs::write(path, encoded).map_err(|e| LabError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(true)
}

/// BOM 或零字节启发式判定 UTF-16-LE
fn is_utf16_le(bytes: &[u8]) -> bool {
    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        return true;
    }
    // ASCII 为主的 UTF-16-LE 文本奇数位字节大多为零
    if bytes.len() < 4 || bytes.len() % 2 != 0 {
        return false;
    }
    let sample = &bytes[..bytes.len().min(4096)];
    let odd_zeros = sample.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    odd_zeros * 2 > sample.len() / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_utf16() {
        let bytes = parsers::encode_utf16_le("Summary Report\nBET Surface Area\n");
        assert!(is_utf16_le(&bytes));
    }

    #[test]
    fn test_detects_ansi() {
        assert!(!is_utf16_le(b"Summary Report\nBET Surface Area\n"));
    }

    #[test]
    fn test_converts_in_place() {
        let dir = std::env::temp_dir().join("labutil_encode_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.txt");
        fs::write(&path, b"Sample: A1\x0225\xB0C\n").unwrap();

        assert!(convert_file(&path, true).unwrap());
        let bytes = fs::read(&path).unwrap();
        assert!(is_utf16_le(&bytes));
        assert!(parsers::decode_text_auto(&bytes).contains("25°C"));

        // 再次转换应当是空操作
        assert!(!convert_file(&path, true).unwrap());

        fs::remove_file(&path).unwrap();
    }
}
