//! # SaveManager 模块
//!
//! 单存档文件的读写。
//!
//! ## 并发约定
//!
//! - 写入：打开文件（不截断）→ 独占锁 → 截断 → 写入 → 同步
//! - 读取：共享锁
//!
//! 截断只在持锁后发生，其他持共享锁的读取者不会看到半截内容。

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use nvl_runtime::{SaveError, SaveSnapshot, SnapshotStore};
use tracing::{debug, info};

/// 存档管理器
pub struct SaveStore {
    /// 存档文件路径
    path: PathBuf,
}

impl SaveStore {
    /// 创建存档管理器
    ///
    /// 不会立即创建文件，首次保存时才创建父目录。
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 存档文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 检查存档是否存在
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// 确保存档所在目录存在
    fn ensure_parent_dir(&self) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .map_err(|e| SaveError::IoError(format!("无法创建存档目录: {}", e)))?;
        }
        Ok(())
    }

    /// 保存存档
    pub fn write(&self, snapshot: &SaveSnapshot) -> Result<(), SaveError> {
        self.ensure_parent_dir()?;
        let json = snapshot.to_json()?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| SaveError::IoError(format!("无法打开存档文件: {}", e)))?;

        file.lock()
            .map_err(|e| SaveError::IoError(format!("无法锁定存档文件: {}", e)))?;

        file.set_len(0)
            .map_err(|e| SaveError::IoError(format!("无法截断存档文件: {}", e)))?;
        file.write_all(json.as_bytes())
            .map_err(|e| SaveError::IoError(format!("无法写入存档文件: {}", e)))?;
        file.sync_all()
            .map_err(|e| SaveError::IoError(format!("无法同步存档文件: {}", e)))?;

        // 锁随 file drop 释放
        debug!(path = %self.path.display(), scene = snapshot.id, "存档保存成功");
        Ok(())
    }

    /// 读取存档
    pub fn read(&self) -> Result<SaveSnapshot, SaveError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SaveError::NotFound {
                    path: self.path.display().to_string(),
                });
            }
            Err(e) => return Err(SaveError::IoError(format!("无法打开存档文件: {}", e))),
        };

        file.lock_shared()
            .map_err(|e| SaveError::IoError(format!("无法锁定存档文件: {}", e)))?;

        let mut json = String::new();
        file.read_to_string(&mut json)
            .map_err(|e| SaveError::IoError(format!("无法读取存档文件: {}", e)))?;

        let snapshot = SaveSnapshot::from_json(&json)?;
        info!(path = %self.path.display(), scene = snapshot.id, "存档读取成功");
        Ok(snapshot)
    }
}

impl SnapshotStore for SaveStore {
    fn save(&mut self, snapshot: &SaveSnapshot) -> Result<(), SaveError> {
        self.write(snapshot)
    }

    fn load(&mut self) -> Result<SaveSnapshot, SaveError> {
        self.read()
    }
}
