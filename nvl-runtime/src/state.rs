//! # State 模块
//!
//! 定义 Runtime 的运行时状态。
//!
//! ## 设计原则
//!
//! - `RuntimeState` 是唯一可变状态，只归 `SceneRuntime` 所有
//! - 只在钩子合并点（见 [`RuntimeState::apply_mutation`]）被脚本修改
//! - 可投影为存档快照，支持存档/读档

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::hook::{Projection, SceneMutation};
use crate::save::SaveSnapshot;
use crate::scene::SceneDescriptor;

/// 选项值
///
/// 只允许标量，JSON 中以无标签形式存储（`{"met_alice": true, "gold": 3}`）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    /// 布尔值
    Bool(bool),
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
}

impl fmt::Display for ChoiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceValue::Bool(v) => write!(f, "{v}"),
            ChoiceValue::Int(v) => write!(f, "{v}"),
            ChoiceValue::Float(v) => write!(f, "{v}"),
            ChoiceValue::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<bool> for ChoiceValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// 选项表（key 唯一，有序以便存档输出稳定）
pub type Choices = BTreeMap<String, ChoiceValue>;

/// Runtime 状态
///
/// # 字段说明
///
/// - `id` ~ `music`：当前场景内容，进入场景时由场景描述覆盖
/// - `choices`：玩家选项，跨场景保留
/// - `show_tab`：是否绘制文本面板，进入场景时重置为 true
/// - `await_input`：一次性标志，每个周期结束后重置为 true
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeState {
    pub id: u32,
    pub text: String,
    pub background: String,
    pub person: String,
    pub music: String,
    pub choices: Choices,
    pub show_tab: bool,
    pub await_input: bool,
}

impl RuntimeState {
    /// 从场景描述创建初始状态
    pub fn from_descriptor(scene: &SceneDescriptor) -> Self {
        let mut state = Self {
            id: scene.id,
            text: String::new(),
            background: String::new(),
            person: String::new(),
            music: String::new(),
            choices: Choices::new(),
            show_tab: true,
            await_input: true,
        };
        state.load_descriptor(scene.id, scene);
        state
    }

    /// 从存档快照恢复状态
    pub fn from_snapshot(snapshot: SaveSnapshot) -> Self {
        Self {
            id: snapshot.id,
            text: snapshot.text,
            background: snapshot.background,
            person: snapshot.person,
            music: snapshot.music,
            choices: snapshot.choices,
            show_tab: true,
            await_input: true,
        }
    }

    /// 用场景描述覆盖当前场景内容
    ///
    /// `id` 是钳制后的位置 id；场景未携带音乐时保留当前音乐。
    pub fn load_descriptor(&mut self, id: u32, scene: &SceneDescriptor) {
        self.id = id;
        self.text.clone_from(&scene.text);
        self.background.clone_from(&scene.background);
        self.person.clone_from(&scene.person);
        if let Some(music) = &scene.music {
            self.music.clone_from(music);
        }
        self.show_tab = true;
    }

    /// 生成传给钩子的投影
    pub fn projection(&self) -> Projection {
        Projection {
            id: self.id,
            text: self.text.clone(),
            background: self.background.clone(),
            person: self.person.clone(),
            music: self.music.clone(),
        }
    }

    /// 合并钩子返回的 mutation
    ///
    /// 未指定的字段保留原值；`show_tab` 未指定时恢复为 true。
    pub fn apply_mutation(&mut self, mutation: SceneMutation) {
        if let Some(text) = mutation.text {
            self.text = text;
        }
        if let Some(person) = mutation.person {
            self.person = person;
        }
        if let Some(background) = mutation.background {
            self.background = background;
        }
        if let Some(choices) = mutation.choices {
            self.choices = choices;
        }
        self.show_tab = mutation.show_tab.unwrap_or(true);
        if let Some(await_input) = mutation.await_input {
            self.await_input = await_input;
        }
    }

    /// 生成存档快照
    pub fn snapshot(&self) -> SaveSnapshot {
        SaveSnapshot {
            id: self.id,
            text: self.text.clone(),
            background: self.background.clone(),
            person: self.person.clone(),
            music: self.music.clone(),
            choices: self.choices.clone(),
        }
    }

    /// 获取选项
    pub fn get_choice(&self, name: &str) -> Option<&ChoiceValue> {
        self.choices.get(name)
    }

    /// 设置选项
    pub fn set_choice(&mut self, name: impl Into<String>, value: ChoiceValue) {
        self.choices.insert(name.into(), value);
    }
}
