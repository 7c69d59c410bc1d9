//! # Engine 模块
//!
//! 场景状态机与主循环。
//!
//! ## 状态
//!
//! ```text
//! Running(id ∈ [1, N]) --advance(id == N)--> Finished
//! Running              --Signal::Quit-----> Stopped
//! ```
//!
//! ## 每次访问的执行顺序
//!
//! 1. 写入存档
//! 2. 调用 `modify_scene` 并合并 mutation
//! 3. 渲染背景与文本面板
//! 4. 调用 `post_scene` 并合并 mutation（本次访问内只触发一次）
//! 5. `await_input` 为 true 时阻塞等待推进信号
//! 6. 重置 `await_input`，然后 advance

use tracing::{debug, error, info, warn};

use crate::error::RuntimeResult;
use crate::hook::HookName;
use crate::runtime::ports::{Collaborators, Signal};
use crate::save::{SaveError, SaveSnapshot};
use crate::scene::SceneSet;
use crate::state::RuntimeState;

/// 运行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 正在播放
    Running,
    /// 已越过最后一个场景
    Finished,
    /// 玩家中途退出
    Stopped,
}

/// 一次 `run` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// 按顺序访问过的场景 id
    pub visited: Vec<u32>,
    /// 结束时的阶段
    pub phase: Phase,
}

/// 场景 Runtime
///
/// 独占 [`RuntimeState`]，并通过 [`Collaborators`] 驱动脚本、渲染、存档、
/// 音频与输入。
///
/// # 使用示例
///
/// ```ignore
/// let mut runtime = SceneRuntime::resume(scenes, collaborators)?;
/// let summary = runtime.run()?;
/// ```
pub struct SceneRuntime {
    scenes: SceneSet,
    state: RuntimeState,
    phase: Phase,
    host: Collaborators,
}

impl SceneRuntime {
    /// 从第一个场景开始
    pub fn start(scenes: SceneSet, host: Collaborators) -> RuntimeResult<Self> {
        Self::start_at(scenes, host, 1)
    }

    /// 从指定场景开始（目标钳制到 `[1, N]`）
    pub fn start_at(scenes: SceneSet, host: Collaborators, target: i64) -> RuntimeResult<Self> {
        let state = RuntimeState::from_descriptor(scenes.first());
        let mut runtime = Self {
            scenes,
            state,
            phase: Phase::Running,
            host,
        };
        runtime.enter(target)?;
        Ok(runtime)
    }

    /// 尝试从存档恢复，失败时从头开始
    ///
    /// 存档缺失或损坏都不是致命错误。
    pub fn resume(scenes: SceneSet, mut host: Collaborators) -> RuntimeResult<Self> {
        match host.saves.load() {
            Ok(snapshot) => Ok(Self::restore(scenes, host, snapshot)),
            Err(SaveError::NotFound { path }) => {
                info!(path = %path, "未找到存档，从头开始");
                Self::start(scenes, host)
            }
            Err(SaveError::Corrupt { reason, salvaged }) => {
                error!(reason = %reason, "存档损坏，选项已重置");
                match salvaged {
                    Some(snapshot) => Ok(Self::restore(scenes, host, *snapshot)),
                    None => Self::start(scenes, host),
                }
            }
            Err(e) => {
                error!(error = %e, "读取存档失败，从头开始");
                Self::start(scenes, host)
            }
        }
    }

    /// 用快照恢复状态，加载对应场景但不执行其脚本
    fn restore(scenes: SceneSet, mut host: Collaborators, snapshot: SaveSnapshot) -> Self {
        let id = scenes.clamp_id(i64::from(snapshot.id));
        if id != snapshot.id {
            warn!(saved = snapshot.id, clamped = id, "存档场景 id 越界，已钳制");
        }

        let mut state = RuntimeState::from_snapshot(snapshot);
        let scene = scenes.get(id);
        state.load_descriptor(id, scene);
        if !state.music.is_empty() {
            host.music.play(&state.music);
        }
        info!(scene = id, choices = state.choices.len(), "已从存档恢复");

        Self {
            scenes,
            state,
            phase: Phase::Running,
            host,
        }
    }

    /// 当前状态
    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    /// 当前阶段
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// 场景集合
    pub fn scenes(&self) -> &SceneSet {
        &self.scenes
    }

    /// 运行主循环直到结束或退出
    ///
    /// 线性推进时共执行 `N - (id - 1)` 次访问。
    pub fn run(&mut self) -> RuntimeResult<RunSummary> {
        info!(scene = self.state.id, total = self.scenes.len(), "进入主循环");
        let mut visited = Vec::new();
        while self.phase == Phase::Running {
            visited.push(self.state.id);
            self.run_visit()?;
        }
        info!(phase = ?self.phase, visits = visited.len(), "主循环结束");
        Ok(RunSummary {
            visited,
            phase: self.phase,
        })
    }

    /// 执行一次完整的场景访问，然后 advance
    pub fn run_visit(&mut self) -> RuntimeResult<()> {
        debug!(scene = self.state.id, "开始场景访问");

        if let Err(e) = self.host.saves.save(&self.state.snapshot()) {
            error!(scene = self.state.id, error = %e, "写入存档失败");
        }

        self.apply_hook(HookName::ModifyScene)?;
        self.host.renderer.render(&self.state)?;
        self.apply_hook(HookName::PostScene)?;

        if self.state.await_input {
            if self.host.input.wait()? == Signal::Quit {
                info!(scene = self.state.id, "玩家退出");
                self.phase = Phase::Stopped;
                return Ok(());
            }
        } else {
            debug!(scene = self.state.id, "本周期跳过输入等待");
        }
        self.state.await_input = true;

        self.advance()
    }

    /// 前进到下一场景；已在最后一个场景时进入 Finished
    pub fn advance(&mut self) -> RuntimeResult<()> {
        if self.phase != Phase::Running {
            return Ok(());
        }
        if self.state.id < self.scenes.len() {
            self.enter(i64::from(self.state.id) + 1)
        } else {
            info!(scene = self.state.id, "已到达最后一个场景");
            self.phase = Phase::Finished;
            Ok(())
        }
    }

    /// 回到上一场景（最小为 1）
    pub fn rewind(&mut self) -> RuntimeResult<()> {
        self.enter(i64::from(self.state.id) - 1)
    }

    /// 跳转到指定场景（钳制到 `[1, N]`）
    pub fn jump_to(&mut self, target: i64) -> RuntimeResult<()> {
        self.enter(target)
    }

    /// 进入场景：加载描述、播放音乐、执行场景脚本
    fn enter(&mut self, target: i64) -> RuntimeResult<()> {
        let id = self.scenes.clamp_id(target);
        let scene = self.scenes.get(id);
        debug!(scene = id, target = target, "进入场景");

        self.state.load_descriptor(id, scene);
        if let Some(music) = &scene.music {
            self.host.music.play(music);
        }
        if let Some(script) = &scene.script {
            self.host.scripts.load_script(script)?;
        }
        Ok(())
    }

    /// 调用钩子并合并返回的 mutation
    fn apply_hook(&mut self, hook: HookName) -> RuntimeResult<()> {
        let projection = self.state.projection();
        let mutation =
            self.host
                .scripts
                .invoke_hook(hook, &projection, &mut self.state.choices)?;
        if let Some(mutation) = mutation {
            debug!(scene = self.state.id, hook = %hook, "合并钩子返回值");
            self.state.apply_mutation(mutation);
        }
        Ok(())
    }
}
