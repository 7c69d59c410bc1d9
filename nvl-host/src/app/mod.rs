//! # App 模块
//!
//! 启动流程：
//!
//! ```text
//! 配置 → 日志 → 场景目录 → 终端 → 协作者 → SceneRuntime → 主循环
//! ```
//!
//! 致命错误沿 `?` 返回到 `main`；终端由 [`TerminalGuard`] 在 drop 时恢复。

mod init;

pub use init::*;

use std::io::{self, BufWriter};

use nvl_runtime::{
    Collaborators, Phase, RunSummary, RuntimeResult, SceneRuntime, SceneSet,
};
use tracing::info;

use crate::config::AppConfig;
use crate::input::{TerminalGuard, TerminalInput};
use crate::renderer::Viewport;
use crate::scene_store;

/// 启动方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// 有存档则读档，否则从第一个场景开始
    Resume,
    /// 忽略存档，从第一个场景开始
    Fresh,
    /// 忽略存档，跳转到指定场景（会被钳制）
    At(i64),
}

impl StartMode {
    /// 由命令行参数决定
    pub fn from_flags(fresh: bool, scene: Option<i64>) -> Self {
        match scene {
            Some(id) => StartMode::At(id),
            None if fresh => StartMode::Fresh,
            None => StartMode::Resume,
        }
    }
}

/// 按启动方式创建 SceneRuntime
pub fn start_runtime(
    scenes: SceneSet,
    host: Collaborators,
    mode: StartMode,
) -> RuntimeResult<SceneRuntime> {
    info!(mode = ?mode, scenes = scenes.len(), "启动运行时");
    match mode {
        StartMode::Resume => SceneRuntime::resume(scenes, host),
        StartMode::Fresh => SceneRuntime::start(scenes, host),
        StartMode::At(target) => SceneRuntime::start_at(scenes, host, target),
    }
}

/// 在终端中运行整部小说
pub fn run(config: &AppConfig, mode: StartMode) -> anyhow::Result<RunSummary> {
    let scenes = scene_store::load(config.scene_dir_full_path())?;

    let _guard = TerminalGuard::enter(&config.novel_name)?;
    let host = create_collaborators(
        config,
        BufWriter::new(io::stdout()),
        Viewport::Terminal,
        Box::new(TerminalInput),
    )?;

    let mut runtime = start_runtime(scenes, host, mode)?;
    let summary = runtime.run()?;

    match summary.phase {
        Phase::Finished => info!(visits = summary.visited.len(), "小说播放完毕"),
        _ => info!(visits = summary.visited.len(), phase = ?summary.phase, "提前退出"),
    }
    Ok(summary)
}
