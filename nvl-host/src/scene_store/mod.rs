//! # SceneStore 模块
//!
//! 扫描场景目录，加载每个 `*.json` 场景描述。
//!
//! 只做构造 [`SceneDescriptor`] 所需的结构检查：
//! - 目录存在且至少有一个场景文件
//! - `id`/`text`/`person`/`background` 齐全，`id` 为正整数
//!
//! id 连续性、引用文件是否存在等语义校验由外部校验工具负责。

use std::fs;
use std::path::{Path, PathBuf};

use nvl_runtime::{SceneDescriptor, SceneLoadError, SceneSet};
use tracing::{debug, info};

/// 加载场景目录
pub fn load(directory: impl AsRef<Path>) -> Result<SceneSet, SceneLoadError> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(SceneLoadError::new(format!(
            "场景目录不存在: {}",
            directory.display()
        )));
    }

    let files = scan_scene_files(directory)?;
    if files.is_empty() {
        return Err(SceneLoadError::new(format!(
            "场景目录中没有场景文件: {}",
            directory.display()
        )));
    }

    let mut scenes = Vec::with_capacity(files.len());
    for path in files {
        let scene = load_scene_file(&path)?;
        debug!(path = %path.display(), id = scene.id, "场景加载成功");
        scenes.push(scene);
    }

    let set = SceneSet::new(scenes)?;
    info!(count = set.len(), directory = %directory.display(), "场景目录加载完成");
    Ok(set)
}

/// 扫描目录中的 `*.json` 文件，按文件名排序
fn scan_scene_files(directory: &Path) -> Result<Vec<PathBuf>, SceneLoadError> {
    let entries = fs::read_dir(directory).map_err(|e| {
        SceneLoadError::new(format!("无法读取场景目录 {}: {}", directory.display(), e))
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();

    // 按文件名排序，确保顺序稳定
    files.sort();
    Ok(files)
}

/// 解析单个场景文件
fn load_scene_file(path: &Path) -> Result<SceneDescriptor, SceneLoadError> {
    let content = fs::read_to_string(path)
        .map_err(|e| SceneLoadError::new(format!("无法读取 {}: {}", path.display(), e)))?;

    let scene: SceneDescriptor = serde_json::from_str(&content)
        .map_err(|e| SceneLoadError::new(format!("{} 格式错误: {}", path.display(), e)))?;

    if scene.id == 0 {
        return Err(SceneLoadError::new(format!(
            "{} 的 id 必须为正整数",
            path.display()
        )));
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_sorted_by_id() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "2.json",
            r#"{"id": 2, "text": "b", "person": "p", "background": "bg.png", "music": "a.ogg"}"#,
        );
        write(
            dir.path(),
            "10.json",
            r#"{"id": 10, "text": "c", "person": "p", "background": "bg.png"}"#,
        );
        write(
            dir.path(),
            "1.json",
            r#"{"id": 1, "text": "a", "person": "p", "background": "bg.png", "script": "1.lua"}"#,
        );
        write(dir.path(), "notes.txt", "ignored");

        let set = load(dir.path()).unwrap();
        let ids: Vec<u32> = set.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 10]);
        assert_eq!(set.first().script.as_deref(), Some("1.lua"));
        assert_eq!(set.get(2).music.as_deref(), Some("a.ogg"));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("nope")).unwrap_err();
        assert!(err.reason.contains("场景目录不存在"));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "readme.md", "# scenes");
        let err = load(dir.path()).unwrap_err();
        assert!(err.reason.contains("没有场景文件"));
    }

    #[test]
    fn test_missing_required_field() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "1.json",
            r#"{"id": 1, "text": "a", "background": "bg.png"}"#,
        );
        let err = load(dir.path()).unwrap_err();
        assert!(err.reason.contains("person"), "{}", err.reason);
    }

    #[test]
    fn test_invalid_id() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "1.json",
            r#"{"id": -1, "text": "a", "person": "p", "background": "bg.png"}"#,
        );
        assert!(load(dir.path()).is_err());

        write(
            dir.path(),
            "1.json",
            r#"{"id": 0, "text": "a", "person": "p", "background": "bg.png"}"#,
        );
        let err = load(dir.path()).unwrap_err();
        assert!(err.reason.contains("正整数"));
    }
}
