// apps/we_cli/src/commands/validate.rs

//! 请求验证命令
//!
//! 解析请求 JSON 并检查字段取值，另外对可运行但代价较大的组合给出警告。

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{error, info, warn};

use we_config::{SimulationRequest, SpectrumModel};
use we_physics::GridBuilder;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 请求文件路径 (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn passed(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== WaveEnv 请求验证 ===");
    println!("检查请求文件: {}", args.config.display());

    let mut result = ValidationResult::default();
    match SimulationRequest::from_file(&args.config) {
        Ok(request) => check_request(&request, &mut result),
        Err(e) => result.add_error(e.to_string()),
    }

    print_validation_result(&result, args.strict)
}

fn check_request(request: &SimulationRequest, result: &mut ValidationResult) {
    if let Err(e) = request.validate() {
        result.add_error(e.to_string());
        return;
    }

    if request.spectrum.spectrum_model_type != SpectrumModel::PiersonMoskowitz {
        result.add_error(format!(
            "暂不支持的谱模型: {}",
            request.spectrum.spectrum_model_type.id()
        ));
    }

    let (nx, ny) = GridBuilder::new(&request.region, &request.discretization).requested_dimensions();
    if nx.saturating_mul(ny) > request.discretization.max_points {
        result.add_warning(format!(
            "网格 {}x{} 超过 max_points={}，步长将被放大",
            nx, ny, request.discretization.max_points
        ));
    }

    match request.time.time_limit() {
        None => result.add_warning("未给出 t_total，实时任务需手动停止"),
        Some(t) if t < request.time.dt_backend => {
            result.add_warning(format!("t_total={} 小于 dt_backend，只会产生 t=0 帧", t))
        }
        Some(_) => {}
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    for err in &result.errors {
        error!("{}", err);
        println!("  ✗ 错误: {}", err);
    }
    for warning in &result.warnings {
        warn!("{}", warning);
        println!("  ⚠ 警告: {}", warning);
    }

    if result.passed(strict) {
        println!("✓ 验证通过");
        return Ok(());
    }
    bail!(
        "验证失败：{} 个错误，{} 个警告{}",
        result.errors.len(),
        result.warnings.len(),
        if strict { "（严格模式）" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use we_config::{Region, SpectrumConfig, TimeConfig};

    fn request() -> SimulationRequest {
        SimulationRequest::new(Region::new(120.0, 30.0, 120.5, 30.5))
            .with_time(TimeConfig::default().with_total(2.0))
    }

    #[test]
    fn test_valid_request_passes() {
        let mut result = ValidationResult::default();
        check_request(&request(), &mut result);
        assert!(result.passed(true), "{:?} {:?}", result.errors, result.warnings);
    }

    #[test]
    fn test_unbounded_request_warns() {
        let mut result = ValidationResult::default();
        check_request(&request().with_time(TimeConfig::default()), &mut result);
        assert!(result.passed(false));
        assert!(!result.passed(true));
    }

    #[test]
    fn test_jonswap_rejected() {
        let spectrum = SpectrumConfig {
            spectrum_model_type: SpectrumModel::Jonswap,
            ..SpectrumConfig::default()
        };
        let mut result = ValidationResult::default();
        check_request(&request().with_spectrum(spectrum), &mut result);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_coarsened_grid_warns() {
        let mut req = request();
        req.discretization.max_points = 10;
        let mut result = ValidationResult::default();
        check_request(&req, &mut result);
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_inverted_region_rejected() {
        let mut result = ValidationResult::default();
        check_request(&SimulationRequest::new(Region::new(121.0, 30.0, 120.0, 31.0)), &mut result);
        assert!(!result.errors.is_empty());
    }
}
