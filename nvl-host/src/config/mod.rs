//! # Config 模块
//!
//! 运行时配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (novel.json)
//! 3. 默认值（最低）
//!
//! `scene_directory` 与 `save_path` 必须配置，缺失时启动失败。

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 小说名称（用作终端标题）
    #[serde(default)]
    pub novel_name: String,

    /// **场景目录**（相对于 assets_root）
    ///
    /// 必须配置。
    #[serde(default)]
    pub scene_directory: PathBuf,

    /// **存档文件路径**（相对于 assets_root）
    ///
    /// 必须配置。
    #[serde(default)]
    pub save_path: PathBuf,

    /// 资源根目录，场景中的相对路径都基于此目录解析
    #[serde(default = "default_assets_root")]
    pub assets_root: PathBuf,

    /// 渲染配置
    #[serde(default)]
    pub render: RenderConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 渲染配置
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// 字形集合，按亮度从浅到深排列
    #[serde(default = "default_glyphs")]
    pub glyphs: String,

    /// 首帧预留给文本面板的行数
    #[serde(default = "default_tab_height")]
    pub initial_tab_height: u16,

    /// 面板边框颜色 (RGB)
    #[serde(default = "default_border_color")]
    pub border_color: [u8; 3],
}

/// 音频配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 是否启用音频
    #[serde(default = "default_audio_enabled")]
    pub enabled: bool,

    /// BGM 音量 (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

/// 日志配置
///
/// 终端用于渲染，日志只写入文件。
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志文件路径（启动时清空）
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub level: String,
}

// 默认值函数
fn default_assets_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_glyphs() -> String {
    "▒▓▓█".to_string()
}

fn default_tab_height() -> u16 {
    3
}

fn default_border_color() -> [u8; 3] {
    [255, 255, 255]
}

fn default_audio_enabled() -> bool {
    true
}

fn default_volume() -> f32 {
    1.0
}

fn default_log_file() -> PathBuf {
    PathBuf::from("app.log")
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            novel_name: String::new(),
            scene_directory: PathBuf::new(), // 必须在配置文件中设置
            save_path: PathBuf::new(),       // 必须在配置文件中设置
            assets_root: default_assets_root(),
            render: RenderConfig::default(),
            audio: AudioConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            glyphs: default_glyphs(),
            initial_tab_height: default_tab_height(),
            border_color: default_border_color(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_audio_enabled(),
            volume: default_volume(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 此时日志尚未初始化，错误直接返回给调用方。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // **必须配置场景目录与存档路径**
        if self.scene_directory.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "必须配置 scene_directory（场景目录）".to_string(),
            ));
        }

        if self.save_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "必须配置 save_path（存档路径）".to_string(),
            ));
        }

        if self.render.glyphs.chars().next().is_none() {
            return Err(ConfigError::ValidationFailed(
                "字形集合不能为空".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(ConfigError::ValidationFailed(
                "音量必须在 0.0 - 1.0 之间".to_string(),
            ));
        }

        self.log_level()?;

        Ok(())
    }

    /// 解析资源路径（绝对路径保持不变）
    pub fn asset_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.assets_root.join(path)
    }

    /// 场景目录完整路径
    pub fn scene_dir_full_path(&self) -> PathBuf {
        self.asset_path(&self.scene_directory)
    }

    /// 存档完整路径
    pub fn save_full_path(&self) -> PathBuf {
        self.asset_path(&self.save_path)
    }

    /// 日志级别
    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log.level.parse().map_err(|_| {
            ConfigError::ValidationFailed(format!("无效的日志级别: {}", self.log.level))
        })
    }
}

/// 配置错误
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// 配置文件不存在
    #[error("配置文件不存在: {0}")]
    NotFound(String),
    /// 解析失败
    #[error("配置解析失败: {0}")]
    ParseFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
