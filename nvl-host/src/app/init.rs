//! 启动初始化拆分
//!
//! 配置加载、日志、协作者创建各自独立，`app/mod.rs` 只负责串联。

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, anyhow};
use nvl_runtime::{AdvanceSignal, Collaborators, ScriptError};
use tracing::{info, warn};

use crate::audio::create_music_player;
use crate::config::{AppConfig, ConfigError};
use crate::renderer::{GlyphSet, RenderPipeline, Viewport};
use crate::save_manager::SaveStore;
use crate::script_host::ScriptHost;

/// 加载并验证配置
///
/// 配置文件不存在时使用默认值，随后的验证会因缺少必填项而失败。
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let config = match AppConfig::load(path) {
        Ok(config) => config,
        Err(ConfigError::NotFound(_)) => AppConfig::default(),
        Err(e) => return Err(e),
    };
    config.validate()?;
    Ok(config)
}

/// 初始化日志
///
/// 终端用于渲染，日志写入文件（启动时清空），不带 ANSI 颜色。
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let level = config.log_level()?;
    let path = &config.log.file;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("无法创建日志目录: {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("无法创建日志文件: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
        .map_err(|e| anyhow!("日志初始化失败: {}", e))?;

    info!(path = %path.display(), level = %level, "日志初始化成功");
    if config.novel_name.is_empty() {
        warn!("未配置 novel_name，终端标题为空");
    }
    Ok(())
}

pub fn create_script_host(config: &AppConfig) -> Result<ScriptHost, ScriptError> {
    let host = ScriptHost::new(&config.assets_root)?;
    info!(assets_root = %config.assets_root.display(), "脚本引擎初始化成功");
    Ok(host)
}

pub fn create_renderer<W: Write>(config: &AppConfig, out: W, viewport: Viewport) -> RenderPipeline<W> {
    let glyphs = GlyphSet::new(&config.render.glyphs).unwrap_or_default();
    info!(glyphs = glyphs.len(), viewport = ?viewport, "渲染管线初始化成功");
    RenderPipeline::new(
        out,
        viewport,
        glyphs,
        &config.assets_root,
        config.render.initial_tab_height,
    )
    .with_border_color(config.render.border_color)
}

pub fn create_save_store(config: &AppConfig) -> SaveStore {
    let store = SaveStore::new(config.save_full_path());
    info!(path = %store.path().display(), exists = store.exists(), "存档位置");
    store
}

/// 创建全部协作者
///
/// 渲染输出与输入源由调用方提供：正常运行时是终端，测试中是内存实现。
pub fn create_collaborators<W: Write + 'static>(
    config: &AppConfig,
    out: W,
    viewport: Viewport,
    input: Box<dyn AdvanceSignal>,
) -> Result<Collaborators, ScriptError> {
    Ok(Collaborators {
        scripts: Box::new(create_script_host(config)?),
        renderer: Box::new(create_renderer(config, out, viewport)),
        saves: Box::new(create_save_store(config)),
        music: create_music_player(config.audio.enabled, &config.assets_root, config.audio.volume),
        input,
    })
}
