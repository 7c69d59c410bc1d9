//! # Scene 模块
//!
//! 场景描述与有序场景集合。
//!
//! 场景描述在启动时加载一次，之后不可变。`SceneSet` 只做构造实体所需的
//! 结构检查；id 连续性等语义校验由外部校验工具负责，这里通过钳制索引兜底。

use serde::{Deserialize, Serialize};

use crate::error::SceneLoadError;

/// 场景描述
///
/// 对应场景目录中的一个 JSON 文件：
///
/// ```json
/// { "id": 1, "text": "...", "person": "Alice", "background": "bg/room.png",
///   "script": "scripts/1.lua", "music": "bgm/theme.ogg" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    /// 场景 id（正整数，从 1 开始连续）
    pub id: u32,
    /// 叙述文本
    pub text: String,
    /// 说话人
    pub person: String,
    /// 背景图片路径
    pub background: String,
    /// 场景脚本路径（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// 背景音乐路径（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
}

impl SceneDescriptor {
    /// 创建只包含必需字段的场景描述
    pub fn new(
        id: u32,
        text: impl Into<String>,
        person: impl Into<String>,
        background: impl Into<String>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            person: person.into(),
            background: background.into(),
            script: None,
            music: None,
        }
    }

    /// 设置场景脚本
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// 设置背景音乐
    pub fn with_music(mut self, music: impl Into<String>) -> Self {
        self.music = Some(music.into());
        self
    }
}

/// 按 id 升序排列的场景集合
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSet {
    scenes: Vec<SceneDescriptor>,
}

impl SceneSet {
    /// 从场景描述构造集合
    ///
    /// 按 id 升序排序；空集合返回错误。
    pub fn new(mut scenes: Vec<SceneDescriptor>) -> Result<Self, SceneLoadError> {
        if scenes.is_empty() {
            return Err(SceneLoadError::new("没有可用的场景"));
        }
        if let Some(bad) = scenes.iter().find(|s| s.id == 0) {
            return Err(SceneLoadError::new(format!(
                "场景 id 必须为正整数，实际为 {}",
                bad.id
            )));
        }
        scenes.sort_by_key(|s| s.id);
        Ok(Self { scenes })
    }

    /// 场景数量 N
    pub fn len(&self) -> u32 {
        self.scenes.len() as u32
    }

    /// 集合是否为空（构造时已保证非空）
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// 将任意目标 id 钳制到 `[1, N]`
    pub fn clamp_id(&self, target: i64) -> u32 {
        target.clamp(1, i64::from(self.len())) as u32
    }

    /// 获取第 `id` 个场景（按位置索引，越界时钳制）
    pub fn get(&self, id: u32) -> &SceneDescriptor {
        let id = self.clamp_id(i64::from(id));
        &self.scenes[(id - 1) as usize]
    }

    /// 第一个场景
    pub fn first(&self) -> &SceneDescriptor {
        &self.scenes[0]
    }

    /// 遍历所有场景
    pub fn iter(&self) -> impl Iterator<Item = &SceneDescriptor> {
        self.scenes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenes(ids: &[u32]) -> Vec<SceneDescriptor> {
        ids.iter()
            .map(|&id| SceneDescriptor::new(id, format!("text {id}"), "narrator", "bg.png"))
            .collect()
    }

    #[test]
    fn test_scene_set_sorts_by_id() {
        let set = SceneSet::new(scenes(&[3, 1, 2])).unwrap();
        let ids: Vec<u32> = set.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(set.first().id, 1);
    }

    #[test]
    fn test_empty_scene_set_rejected() {
        let err = SceneSet::new(Vec::new()).unwrap_err();
        assert!(err.reason.contains("没有可用的场景"));
    }

    #[test]
    fn test_zero_id_rejected() {
        assert!(SceneSet::new(scenes(&[0, 1])).is_err());
    }

    #[test]
    fn test_clamp_and_get() {
        let set = SceneSet::new(scenes(&[1, 2, 3])).unwrap();
        assert_eq!(set.clamp_id(0), 1);
        assert_eq!(set.clamp_id(-7), 1);
        assert_eq!(set.clamp_id(8), 3);
        assert_eq!(set.get(99).id, 3);
        assert_eq!(set.get(0).id, 1);
    }

    #[test]
    fn test_descriptor_optional_fields() {
        let json = r#"{"id": 2, "text": "hi", "person": "Bob", "background": "b.png"}"#;
        let desc: SceneDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc.script, None);
        assert_eq!(desc.music, None);

        let missing = r#"{"id": 2, "text": "hi", "background": "b.png"}"#;
        assert!(serde_json::from_str::<SceneDescriptor>(missing).is_err());
    }
}
