//! # xrf 命令分发与公共上下文
//!
//! calibrate 和 analyze 共享同一套光谱读取与测量排布逻辑：
//! 读谱、查元素、建支架分配、补齐粉末质量与样品标签。
//! 这里集中构建一次，子命令只关心各自的数学。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 使用
//! - 使用 `cli/xrf.rs` 定义的参数
//! - 使用 `parsers/xrf_csv.rs`, `xrf/` 分析模块

pub mod analyze;
pub mod calibrate;
pub mod list;

use crate::cli::xrf::{self, SpectraArgs, XrfArgs, XrfCommands};
use crate::error::{LabError, Result};
use crate::models::XrfSpectraSet;
use crate::parsers::xrf_csv;
use crate::utils::output;
use crate::xrf::{lookup_element, ElementData, HolderPlan};

/// 执行 xrf 命令
pub fn execute(args: XrfArgs) -> Result<()> {
    match args.command {
        XrfCommands::Calibrate(args) => calibrate::execute(args),
        XrfCommands::Analyze(args) => analyze::execute(args),
        XrfCommands::ListCalibs(args) => list::execute(args),
    }
}

/// calibrate / analyze 共用的测量上下文
pub struct XrfContext {
    pub set: XrfSpectraSet,
    pub elements: Vec<ElementData>,
    pub powder: ElementData,
    pub plan: HolderPlan,
    pub subtract_background: bool,
    /// 每个样品的粉末质量 (mg)
    pub powder_weights: Vec<f64>,
    /// 每个样品的标签
    pub labels: Vec<String>,
}

/// 从共享参数构建测量上下文
pub fn build_context(args: &SpectraArgs) -> Result<XrfContext> {
    let element_names = xrf::parse_str_list(&args.elements);
    if element_names.is_empty() {
        return Err(LabError::InvalidArgument(
            "no elements given (use --elements)".to_string(),
        ));
    }
    let elements = element_names
        .iter()
        .map(|name| lookup_element(name))
        .collect::<Result<Vec<_>>>()?;
    let powder = lookup_element(&args.powder_element)?;

    let set = xrf_csv::parse_spectra(&args.spectra, args.repeats, !args.keep_first)?;
    output::print_info(&format!(
        "Read {} spectra ({} positions x {} repeats x {} beams)",
        set.spectra.len(),
        set.num_samples(),
        set.repeats,
        set.num_beams
    ));

    for element in elements.iter().chain(std::iter::once(&powder)) {
        if element.beam as usize >= set.num_beams {
            return Err(LabError::InvalidArgument(format!(
                "element {} needs beam {} but the file only has {} beams",
                element.symbol, element.beam, set.num_beams
            )));
        }
    }

    let holders = xrf::parse_holder_list(&args.holders).map_err(LabError::InvalidArgument)?;
    let subtract_background = !args.skip_background && !holders.is_empty();
    let plan = if subtract_background {
        HolderPlan::new(&holders, set.num_samples())?
    } else {
        // 无本底扣除：所有谱位置都是样品
        HolderPlan {
            assignment: vec![0; set.num_samples()],
            num_holders: 0,
        }
    };
    let num_samples = plan.num_samples();
    if num_samples == 0 {
        return Err(LabError::NotEnoughData {
            what: "sample spectra after background holders".to_string(),
            got: 0,
            need: 1,
        });
    }
    if subtract_background {
        output::print_info(&format!(
            "Background subtraction on: {} holder(s), {} sample(s)",
            plan.num_holders, num_samples
        ));
    } else {
        output::print_info(&format!(
            "Background subtraction off: {} sample(s)",
            num_samples
        ));
    }

    let weight_list = xrf::parse_f64_list(&args.powder_weights).map_err(LabError::InvalidArgument)?;
    if weight_list.is_empty() {
        return Err(LabError::InvalidArgument(
            "no powder weights given (use --powder-weights)".to_string(),
        ));
    }
    // 质量与标签不足时循环补齐
    let powder_weights: Vec<f64> = (0..num_samples)
        .map(|i| weight_list[i % weight_list.len()])
        .collect();

    let given_labels = xrf::parse_str_list(&args.labels);
    let labels: Vec<String> = (0..num_samples)
        .map(|i| match given_labels.get(i) {
            Some(label) => label.clone(),
            None => format!("Sample {} {}", i + 1, powder_weights[i]),
        })
        .collect();

    Ok(XrfContext {
        set,
        elements,
        powder,
        plan,
        subtract_background,
        powder_weights,
        labels,
    })
}

/// 样品中某元素各峰的归一化面积及误差
///
/// 以基体元素第一个峰的面积为归一化分母，误差按方和根合成。
pub fn normalize_integrals(
    element_avgs: &[f64],
    element_stds: &[f64],
    powder_avgs: &[f64],
    powder_stds: &[f64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    let powder = powder_avgs[0];
    if powder.abs() < 1e-300 {
        return Err(LabError::Other(
            "powder element peak area is zero, cannot normalize".to_string(),
        ));
    }
    let powder_std = powder_stds[0];

    let mut norms = Vec::with_capacity(element_avgs.len());
    let mut errs = Vec::with_capacity(element_avgs.len());
    for (&avg, &std) in element_avgs.iter().zip(element_stds) {
        norms.push(avg / powder);
        let a = std / powder;
        let b = avg * powder_std / (powder * powder);
        errs.push((a * a + b * b).sqrt());
    }
    Ok((norms, errs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_integrals() {
        let (norms, errs) =
            normalize_integrals(&[10.0, 20.0], &[1.0, 2.0], &[100.0, 50.0], &[5.0, 1.0]).unwrap();
        assert!((norms[0] - 0.1).abs() < 1e-12);
        assert!((norms[1] - 0.2).abs() < 1e-12);
        // sqrt((1/100)^2 + (10*5/100^2)^2)
        let expected = (0.01f64 * 0.01 + 0.005 * 0.005).sqrt();
        assert!((errs[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_powder_is_error() {
        assert!(normalize_integrals(&[1.0], &[0.1], &[0.0], &[0.0]).is_err());
    }
}
