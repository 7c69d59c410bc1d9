//! # Error 模块
//!
//! 定义 nvl-runtime 中使用的错误类型。
//!
//! 存档相关错误见 [`crate::save::SaveError`]。

use thiserror::Error;

/// 场景加载错误
///
/// 场景目录结构不合法时由 SceneStore 抛出，此时 Runtime 不会启动。
#[derive(Error, Debug, Clone, PartialEq)]
#[error("场景加载失败: {reason}")]
pub struct SceneLoadError {
    pub reason: String,
}

impl SceneLoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// 脚本错误
///
/// 钩子是受信任的代码，任何脚本错误都视为致命错误。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// 场景脚本顶层执行失败
    #[error("脚本 '{path}' 执行失败 - {message}")]
    LoadFailed { path: String, message: String },

    /// 钩子执行过程中抛出错误
    #[error("钩子 '{hook}' 执行失败 - {message}")]
    HookFailed { hook: String, message: String },

    /// delete_choice 删除了不存在的选项
    #[error("钩子 '{hook}' 试图删除不存在的选项 '{name}'")]
    MissingChoice { hook: String, name: String },

    /// 钩子返回的 mutation 字段类型不正确
    #[error("钩子 '{hook}' 返回的字段 '{field}' 无效 - {message}")]
    InvalidMutation {
        hook: String,
        field: String,
        message: String,
    },
}

/// 渲染错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// 背景图片存在但无法解码
    #[error("背景图片无法解码: {path} - {message}")]
    CorruptImage { path: String, message: String },

    /// 终端写入失败
    #[error("终端输出失败: {0}")]
    Terminal(String),
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        Self::Terminal(e.to_string())
    }
}

/// 运行时错误
///
/// 所有变体都是致命的：由 Host 记录日志后终止进程。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// 脚本错误
    #[error("脚本错误: {0}")]
    Script(#[from] ScriptError),

    /// 渲染错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),

    /// 输入读取失败
    #[error("输入读取失败: {message}")]
    Input { message: String },
}

/// Result 类型别名
pub type RuntimeResult<T> = Result<T, RuntimeError>;
