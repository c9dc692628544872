// apps/we_cli/src/commands/batch.rs

//! 批量求解命令

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use we_physics::{simulate_dense, ComputePool, WaveGrid};

use super::{load_engine, load_request};

/// 批量求解参数
#[derive(Args)]
pub struct BatchArgs {
    /// 请求文件路径 (JSON)，必须给出 t_total
    #[arg(short, long)]
    pub config: PathBuf,

    /// 引擎配置文件路径 (JSON)
    #[arg(short, long)]
    pub engine: Option<PathBuf>,

    /// 结果输出路径 (JSON)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// 执行批量求解
pub fn execute(args: BatchArgs) -> Result<()> {
    info!("=== WaveEnv 批量模拟 ===");

    let request = load_request(&args.config)?;
    if request.time.time_limit().is_none() {
        bail!("批量模拟需要在请求中给出 t_total");
    }
    let engine = load_engine(args.engine.as_deref())?;
    let pool = ComputePool::new(engine.worker_threads)?;

    let start = Instant::now();
    let grid = simulate_dense(&request, &pool)?;
    let elapsed = start.elapsed();

    print_summary(&grid);
    println!("计算时间: {:.3} s", elapsed.as_secs_f64());

    if let Some(path) = &args.output {
        let file = std::fs::File::create(path)
            .with_context(|| format!("无法创建输出文件: {}", path.display()))?;
        serde_json::to_writer(std::io::BufWriter::new(file), &grid)
            .context("结果序列化失败")?;
        info!("结果已写入 {}", path.display());
    }

    Ok(())
}

fn print_summary(grid: &WaveGrid) {
    let max_abs = grid
        .wave_heights
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, h| acc.max(h.abs()));

    println!("=== 批量结果 ===");
    println!("网格点数: {}", grid.num_points());
    println!("时刻数: {}", grid.num_times());
    if let (Some(first), Some(last)) = (grid.times.first(), grid.times.last()) {
        println!("时间范围: {:.3} .. {:.3} s", first, last);
    }
    println!("最大波高绝对值: {:.4} m", max_abs);
}
