//! # Host 层
//!
//! 终端视觉小说引擎的宿主层实现，负责所有 IO。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 场景目录与配置的加载
//! - Lua 场景脚本的执行
//! - 背景图片的字符化渲染与文本面板
//! - 存档读写、背景音乐、按键输入
//!
//! Host 层不包含状态机逻辑，只为 `nvl-runtime` 的协作者接口提供实现。

pub mod app;
pub mod audio;
pub mod config;
pub mod input;
pub mod renderer;
pub mod save_manager;
pub mod scene_store;
pub mod script_host;

pub use app::StartMode;
pub use audio::{AudioManager, NullMusic};
pub use config::{AppConfig, AudioConfig, ConfigError, LogConfig, RenderConfig};
pub use input::{TerminalGuard, TerminalInput};
pub use renderer::{GlyphSet, PanelLayout, RenderPipeline, Viewport};
pub use save_manager::SaveStore;
pub use script_host::ScriptHost;
