//! 终端视觉小说播放器
//!
//! ```bash
//! nvl                         # 读取 novel.json，有存档则继续
//! nvl --config demo.json      # 指定配置文件
//! nvl --fresh                 # 忽略存档，从头开始
//! nvl --scene 5               # 从第 5 个场景开始
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use nvl_host::StartMode;
use nvl_host::app;

#[derive(Parser)]
#[command(name = "nvl")]
#[command(about = "终端视觉小说播放器")]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "novel.json")]
    config: PathBuf,

    /// 忽略存档，从第一个场景开始
    #[arg(long)]
    fresh: bool,

    /// 从指定场景开始（忽略存档，越界时钳制）
    #[arg(short, long, allow_negative_numbers = true)]
    scene: Option<i64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 日志初始化之前的错误只能输出到 stderr
    let config = match app::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = app::init_logging(&config) {
        eprintln!("❌ {:#}", e);
        return ExitCode::FAILURE;
    }

    match app::run(&config, StartMode::from_flags(cli.fresh, cli.scene)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "致命错误，程序终止");
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
