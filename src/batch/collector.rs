//! # 文件收集器
//!
//! 根据输入路径收集待处理的仪器数据文件。
//! 输入为单文件时直接返回该文件；为目录时按 glob 模式
//! 过滤（默认 `*.txt`，对应 Tristar 的文本导出），可选递归。
//!
//! ## 依赖关系
//! - 被 `commands/` 各子命令调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `glob` 做文件名匹配

use crate::error::{LabError, Result};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    input: PathBuf,
    patterns: Vec<Pattern>,
    recursive: bool,
}

impl FileCollector {
    /// 创建收集器，默认匹配 `*.txt`
    pub fn new(input: &Path) -> Result<Self> {
        let mut collector = FileCollector {
            input: input.to_path_buf(),
            patterns: Vec::new(),
            recursive: false,
        };
        collector.set_patterns("*.txt")?;
        Ok(collector)
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.set_patterns(pattern)?;
        Ok(self)
    }

    /// 设置是否递归搜索子目录
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    fn set_patterns(&mut self, pattern: &str) -> Result<()> {
        let mut patterns = Vec::new();
        for part in pattern.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let compiled = Pattern::new(part).map_err(|e| {
                LabError::InvalidArgument(format!("bad file pattern '{}': {}", part, e))
            })?;
            patterns.push(compiled);
        }
        if patterns.is_empty() {
            patterns.push(Pattern::new("*").map_err(|e| {
                LabError::InvalidArgument(format!("bad file pattern '*': {}", e))
            })?);
        }
        self.patterns = patterns;
        Ok(())
    }

    /// 输入是否为单文件
    pub fn is_single_file(&self) -> bool {
        self.input.is_file()
    }

    /// 收集所有匹配的文件
    ///
    /// 输入既非文件也非目录时报错；目录下没有匹配文件时
    /// 返回 NoFilesFound。
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }
        if !self.input.is_dir() {
            return Err(LabError::FileNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(LabError::NoFilesFound {
                pattern: self
                    .patterns
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn make_tree(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("labutil_collector_test_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.txt"), "x").unwrap();
        fs::write(dir.join("b.txt"), "x").unwrap();
        fs::write(dir.join("notes.csv"), "x").unwrap();
        fs::write(dir.join("sub").join("c.txt"), "x").unwrap();
        dir
    }

    #[test]
    fn test_default_pattern_collects_txt() {
        let dir = make_tree("default");
        let files = FileCollector::new(&dir).unwrap().collect().unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_recursive_includes_subdirs() {
        let dir = make_tree("recursive");
        let files = FileCollector::new(&dir)
            .unwrap()
            .recursive(true)
            .collect()
            .unwrap();
        assert_eq!(files.len(), 3);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_multi_pattern() {
        let dir = make_tree("multi");
        let files = FileCollector::new(&dir)
            .unwrap()
            .with_pattern("*.txt, *.csv")
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(files.len(), 3);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_match_is_error() {
        let dir = make_tree("nomatch");
        let result = FileCollector::new(&dir)
            .unwrap()
            .with_pattern("*.res")
            .unwrap()
            .collect();
        assert!(result.is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_single_file_passthrough() {
        let dir = make_tree("single");
        let file = dir.join("notes.csv");
        let collector = FileCollector::new(&file).unwrap();
        assert!(collector.is_single_file());
        assert_eq!(collector.collect().unwrap(), vec![file]);
        let _ = fs::remove_dir_all(&dir);
    }
}
