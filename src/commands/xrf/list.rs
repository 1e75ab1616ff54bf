//! # xrf list-calibs 子命令实现
//!
//! 列出校准目录下的所有校准文件。

use crate::cli::xrf::ListCalibsArgs;
use crate::error::Result;
use crate::utils::output;
use crate::xrf::calibration;

/// 执行 list-calibs 子命令
pub fn execute(args: ListCalibsArgs) -> Result<()> {
    output::print_header("Available Calibrations");

    let names = calibration::list_calibration_files(&args.calib_path)?;
    if names.is_empty() {
        output::print_warning(&format!(
            "No calibration files found in '{}'",
            args.calib_path.display()
        ));
        return Ok(());
    }

    for name in &names {
        output::print_info(name);
    }
    output::print_success(&format!("{} calibration file(s)", names.len()));
    Ok(())
}
