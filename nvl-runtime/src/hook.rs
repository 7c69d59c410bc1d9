//! # Hook 模块
//!
//! 场景脚本钩子的数据契约。
//!
//! 每个场景脚本可定义两个顶层函数：
//!
//! ```lua
//! function modify_scene(scene) ... return { text = "..." } end
//! function post_scene(scene) ... end
//! ```
//!
//! 钩子只能看到 [`Projection`]（外加 Host 提供的三个选项回调），
//! 返回值在脚本边界被转换为 [`SceneMutation`]。

use std::fmt;

use crate::state::Choices;

/// 钩子名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookName {
    /// 渲染前调用
    ModifyScene,
    /// 渲染后调用（一次性）
    PostScene,
}

impl HookName {
    /// 脚本中的函数名
    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::ModifyScene => "modify_scene",
            HookName::PostScene => "post_scene",
        }
    }

    /// 触发一次后是否在本次访问内失效
    pub fn is_one_shot(&self) -> bool {
        matches!(self, HookName::PostScene)
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 传给钩子的只读状态投影
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub id: u32,
    pub text: String,
    pub background: String,
    pub person: String,
    pub music: String,
}

/// 钩子返回的场景修改
///
/// 所有字段可选，未指定的字段保留原值。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMutation {
    pub text: Option<String>,
    pub person: Option<String>,
    pub background: Option<String>,
    /// 整体替换选项表
    pub choices: Option<Choices>,
    pub show_tab: Option<bool>,
    /// 为 false 时跳过本周期的输入等待
    pub await_input: Option<bool>,
}

impl SceneMutation {
    /// 是否没有任何字段
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_names() {
        assert_eq!(HookName::ModifyScene.as_str(), "modify_scene");
        assert_eq!(HookName::PostScene.to_string(), "post_scene");
        assert!(HookName::PostScene.is_one_shot());
        assert!(!HookName::ModifyScene.is_one_shot());
    }

    #[test]
    fn test_empty_mutation() {
        assert!(SceneMutation::default().is_empty());
        let m = SceneMutation {
            show_tab: Some(false),
            ..Default::default()
        };
        assert!(!m.is_empty());
    }
}
