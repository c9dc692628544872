// apps/we_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示版本、默认配置，以及给定请求的网格规模与波成分数。

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use we_config::{EngineConfig, SimulationRequest};
use we_physics::{GridBuilder, SpectrumGenerator, WindField};

use super::load_request;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 请求文件路径 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== WaveEnv 信息 ===");

    if let Some(path) = &args.config {
        let request = load_request(path)?;
        print_request_info(&request)?;
    }

    if args.defaults || args.config.is_none() {
        print_system_info();
        println!();
        print_default_config()?;
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("WaveEnv CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
    println!(
        "可用并行度: {}",
        std::thread::available_parallelism().map_or(1, |n| n.get())
    );
}

fn print_default_config() -> Result<()> {
    println!("=== 默认引擎配置 ===");
    println!("{}", serde_json::to_string_pretty(&EngineConfig::default())?);
    Ok(())
}

fn print_request_info(request: &SimulationRequest) -> Result<()> {
    let builder = GridBuilder::new(&request.region, &request.discretization);
    let (n_lon, n_lat) = builder.dimensions();
    let (raw_lon, raw_lat) = builder.requested_dimensions();
    let wind = WindField::from(&request.wind);
    let spectrum = SpectrumGenerator::new(&wind, &request.spectrum).generate()?;

    println!("=== 请求信息 ===");
    println!(
        "区域: lon [{}, {}], lat [{}, {}]",
        request.region.lon_min, request.region.lon_max, request.region.lat_min, request.region.lat_max
    );
    println!("网格: {} x {} = {} 点", n_lon, n_lat, n_lon * n_lat);
    if (n_lon, n_lat) != (raw_lon, raw_lat) {
        println!("  (按 dx/dy 为 {} x {}，已按 max_points 放大步长)", raw_lon, raw_lat);
    }
    println!(
        "波浪谱: {} 个成分, Hs={} m, Tp={} s, 主浪向={}°",
        spectrum.len(),
        spectrum.hs,
        spectrum.tp,
        spectrum.main_direction_deg
    );
    println!("时间步长: {} s", request.time.dt_backend);
    match request.time.time_limit() {
        Some(t) => println!("总时长: {} s", t),
        None => println!("总时长: 不限"),
    }
    if let Some(r) = request.time.cache_retention_time {
        println!("缓存保留: {} s", r);
    }
    Ok(())
}
