// apps/we_cli/src/commands/run.rs

//! 实时任务命令
//!
//! 创建一个流式任务，运行指定墙钟时长后输出最新帧统计，可选地查询单点波高，
//! 最后停止任务。

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use we_workflow::{FrameQuery, LoggingListener, SimulationManager};

use super::{load_engine, load_request};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 请求文件路径 (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// 引擎配置文件路径 (JSON)
    #[arg(short, long)]
    pub engine: Option<PathBuf>,

    /// 运行时长 [s]
    #[arg(short, long, default_value = "5.0")]
    pub duration: f64,

    /// 查询点 "lon,lat"
    #[arg(short, long)]
    pub query: Option<String>,

    /// 关闭墙钟节拍，尽快推进
    #[arg(long)]
    pub no_realtime: bool,
}

/// 解析 "lon,lat"
pub fn parse_lon_lat(s: &str) -> Result<(f64, f64)> {
    let Some((lon, lat)) = s.split_once(',') else {
        bail!("查询点格式应为 lon,lat: {}", s);
    };
    let lon: f64 = lon.trim().parse().context("经度无效")?;
    let lat: f64 = lat.trim().parse().context("纬度无效")?;
    Ok((lon, lat))
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== WaveEnv 实时模拟 ===");

    let query = args.query.as_deref().map(parse_lon_lat).transpose()?;
    let wall = Duration::try_from_secs_f64(args.duration)
        .with_context(|| format!("运行时长无效: {}", args.duration))?;

    let request = load_request(&args.config)?;
    let mut engine = load_engine(args.engine.as_deref())?;
    if args.no_realtime {
        engine = engine.without_pacing();
    }

    let manager = SimulationManager::new(engine)?;
    manager
        .events()
        .add_listener(Arc::new(LoggingListener::new("we_cli")));

    let id = manager.create(request)?;
    info!("任务已创建: {}", id);
    thread::sleep(wall);

    let summary = manager.get_summary(id)?;
    println!("任务: {}", id);
    println!("状态: {}", summary.status);
    println!("缓存帧数: {}", summary.frame_count);

    match manager.get_latest_frame(id) {
        Ok(frame) => {
            println!("最新帧: t={:.3} s", frame.time);
            println!("  网格点数: {}", frame.len());
            println!("  最大波高绝对值: {:.4} m", frame.max_abs_height());
        }
        Err(e) if e.is_not_found() => println!("暂无帧"),
        Err(e) => return Err(e.into()),
    }

    if let Some((lon, lat)) = query {
        let sample = manager.query_point(id, lon, lat, FrameQuery::Latest)?;
        println!(
            "单点查询: ({:.4}, {:.4}) t={:.3} s 波高={:.4} m",
            sample.lon, sample.lat, sample.time, sample.wave_height
        );
    }

    let status = manager.stop(id)?;
    info!("任务 {} 结束: {}", id, status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lon_lat() {
        assert_eq!(parse_lon_lat("120.25, 30.5").unwrap(), (120.25, 30.5));
        assert!(parse_lon_lat("120.25").is_err());
        assert!(parse_lon_lat("east,30").is_err());
    }
}
