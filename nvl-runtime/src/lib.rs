//! # NVL Runtime
//!
//! 终端视觉小说引擎的核心运行时库。
//!
//! ## 架构概述
//!
//! `nvl-runtime` 是纯逻辑核心，不依赖任何 IO、脚本引擎或终端。
//! 它通过 **协作者接口** 与宿主层（Host）通信：
//!
//! ```text
//! Host                                Runtime
//!   │                                    │
//!   │── SceneSet + Collaborators ───────►│
//!   │                                    │ run()
//!   │◄── save / invoke_hook / render ────│
//!   │◄── play / wait ────────────────────│
//!   │                                    │
//! ```
//!
//! ## 核心类型
//!
//! - [`SceneDescriptor`] / [`SceneSet`]：不可变的场景描述
//! - [`RuntimeState`]：唯一的可变状态
//! - [`SceneMutation`]：钩子返回的场景修改
//! - [`SaveSnapshot`]：存档快照
//! - [`SceneRuntime`]：场景状态机
//!
//! ## 模块结构
//!
//! - [`scene`]：场景描述与集合
//! - [`state`]：RuntimeState 与选项
//! - [`hook`]：脚本钩子契约
//! - [`save`]：存档数据模型
//! - [`error`]：错误类型定义
//! - [`runtime`]：状态机与协作者接口

pub mod error;
pub mod hook;
pub mod runtime;
pub mod save;
pub mod scene;
pub mod state;

// 重导出核心类型
pub use error::{RenderError, RuntimeError, RuntimeResult, SceneLoadError, ScriptError};
pub use hook::{HookName, Projection, SceneMutation};
pub use runtime::{
    AdvanceSignal, Collaborators, MusicPlayer, Phase, RunSummary, SceneRenderer, SceneRuntime,
    ScriptEngine, Signal, SnapshotStore,
};
pub use save::{SaveError, SaveSnapshot};
pub use scene::{SceneDescriptor, SceneSet};
pub use state::{ChoiceValue, Choices, RuntimeState};
