// apps/we_cli/src/main.rs

//! WaveEnv 命令行界面
//!
//! 区域海浪场模拟的命令行工具：实时任务、批量求解、请求校验与信息查看。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// WaveEnv 海浪场模拟命令行工具
#[derive(Parser)]
#[command(name = "we_cli")]
#[command(author = "WaveEnv Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "WaveEnv streaming ocean wave-field simulator", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行实时任务
    Run(commands::run::RunArgs),
    /// 有限时长批量求解
    Batch(commands::batch::BatchArgs),
    /// 验证请求
    Validate(commands::validate::ValidateArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Batch(args) => commands::batch::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
