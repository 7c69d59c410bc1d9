//! # Ports 模块
//!
//! `SceneRuntime` 依赖的协作者接口。
//!
//! Runtime 不做任何 IO：脚本、渲染、存档、音频、输入全部由 Host 通过
//! 这些 trait 注入。测试中可以替换为内存实现。

use crate::error::{RenderError, RuntimeError, ScriptError};
use crate::hook::{HookName, Projection, SceneMutation};
use crate::save::{SaveError, SaveSnapshot};
use crate::state::{Choices, RuntimeState};

/// 脚本引擎
pub trait ScriptEngine {
    /// 执行场景脚本，(重新) 定义其中的钩子
    fn load_script(&mut self, path: &str) -> Result<(), ScriptError>;

    /// 调用钩子
    ///
    /// 钩子未定义时返回 `Ok(None)`。脚本通过选项回调对 `choices` 的修改
    /// 在返回前写回。
    fn invoke_hook(
        &mut self,
        hook: HookName,
        projection: &Projection,
        choices: &mut Choices,
    ) -> Result<Option<SceneMutation>, ScriptError>;
}

/// 场景渲染器
pub trait SceneRenderer {
    /// 绘制背景与（`show_tab` 为 true 时）文本面板
    fn render(&mut self, state: &RuntimeState) -> Result<(), RenderError>;
}

/// 存档存储
pub trait SnapshotStore {
    /// 覆盖写入存档
    fn save(&mut self, snapshot: &SaveSnapshot) -> Result<(), SaveError>;

    /// 读取存档
    fn load(&mut self) -> Result<SaveSnapshot, SaveError>;
}

/// 背景音乐播放器
///
/// 即发即弃：播放新曲目会替换当前曲目，失败只记录日志。
pub trait MusicPlayer {
    fn play(&mut self, path: &str);
}

/// 推进信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// 进入下一场景
    Advance,
    /// 玩家请求退出
    Quit,
}

/// 阻塞等待外部推进信号（无超时）
pub trait AdvanceSignal {
    fn wait(&mut self) -> Result<Signal, RuntimeError>;
}

/// `SceneRuntime` 持有的全部协作者
pub struct Collaborators {
    pub scripts: Box<dyn ScriptEngine>,
    pub renderer: Box<dyn SceneRenderer>,
    pub saves: Box<dyn SnapshotStore>,
    pub music: Box<dyn MusicPlayer>,
    pub input: Box<dyn AdvanceSignal>,
}
