//! # Runtime 模块
//!
//! 场景状态机，负责场景顺序、钩子/渲染/存档的调用时机。
//!
//! ## 模块结构
//!
//! - [`engine`]：状态机与主循环
//! - [`ports`]：Host 注入的协作者接口

pub mod engine;
pub mod ports;


pub use engine::{Phase, RunSummary, SceneRuntime};
pub use ports::{
    AdvanceSignal, Collaborators, MusicPlayer, SceneRenderer, ScriptEngine, Signal, SnapshotStore,
};
