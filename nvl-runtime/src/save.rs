//! # Save 模块
//!
//! 存档快照的数据模型。
//!
//! ## 设计原则
//!
//! - 只保留一个存档，每次进入场景时整体覆盖
//! - 存档是 [`RuntimeState`](crate::state::RuntimeState) 的投影：
//!   `{id, text, background, person, music, choices}`
//! - 存档损坏不是致命错误：尽量从残缺数据中恢复，选项表一律清空

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::Choices;

/// 存档快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub id: u32,
    pub text: String,
    pub background: String,
    pub person: String,
    #[serde(default)]
    pub music: String,
    #[serde(default)]
    pub choices: Choices,
}

impl SaveSnapshot {
    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SaveError::SerializationFailed(e.to_string()))
    }

    /// 从 JSON 字符串反序列化
    ///
    /// 解析失败时返回 [`SaveError::Corrupt`]，并附带可抢救的部分数据。
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        match serde_json::from_str::<SaveSnapshot>(json) {
            Ok(snapshot) if snapshot.id >= 1 => Ok(snapshot),
            Ok(_) => Err(SaveError::Corrupt {
                reason: "场景 id 必须为正整数".to_string(),
                salvaged: None,
            }),
            Err(e) => Err(SaveError::Corrupt {
                reason: e.to_string(),
                salvaged: Self::salvage(json).map(Box::new),
            }),
        }
    }

    /// 从残缺存档中抢救数据
    ///
    /// 要求内容是 JSON 对象且带有正整数 `id`；字符串字段缺失时为空，
    /// 选项表总是清空。
    pub fn salvage(json: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(json).ok()?;
        let object = value.as_object()?;
        let id = object.get("id")?.as_u64().filter(|&id| id >= 1)?;
        let id = u32::try_from(id).ok()?;

        let field = |key: &str| {
            object
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Some(Self {
            id,
            text: field("text"),
            background: field("background"),
            person: field("person"),
            music: field("music"),
            choices: Choices::new(),
        })
    }
}

/// 存档错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    /// 存档不存在
    #[error("存档不存在: {path}")]
    NotFound { path: String },

    /// 存档损坏
    ///
    /// `salvaged` 为抢救出的部分快照（选项表已清空）。
    #[error("存档损坏: {reason}")]
    Corrupt {
        reason: String,
        salvaged: Option<Box<SaveSnapshot>>,
    },

    /// 序列化失败
    #[error("序列化失败: {0}")]
    SerializationFailed(String),

    /// 文件操作失败
    #[error("文件操作失败: {0}")]
    IoError(String),
}
