//! # Audio 模块
//!
//! 背景音乐播放，使用 rodio 库实现。
//! 支持 MP3, WAV, FLAC, OGG 格式。
//!
//! ## 约定
//!
//! - 同一时间只有一个 BGM sink，播放新曲目会停止旧曲目
//! - BGM 总是循环播放
//! - 所有失败（设备不可用、文件缺失、无法解码）都只记录日志

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use nvl_runtime::MusicPlayer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info, warn};

/// 音频管理器
pub struct AudioManager {
    /// 音频输出流（必须保持存活）
    stream: OutputStream,
    /// BGM 播放器
    bgm_sink: Option<Sink>,
    /// 当前 BGM 路径
    current_bgm_path: Option<String>,
    /// BGM 音量 (0.0 - 1.0)
    volume: f32,
    /// 资源基础路径
    base_path: PathBuf,
}

impl AudioManager {
    /// 创建音频管理器
    ///
    /// 没有可用的音频设备时返回错误，由调用方降级为 [`NullMusic`]。
    pub fn new(base_path: impl AsRef<Path>, volume: f32) -> Result<Self, String> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| format!("无法初始化音频输出: {}", e))?;
        // 退出时不要往终端打印提示
        stream.log_on_drop(false);

        info!("音频输出初始化成功");
        Ok(Self {
            stream,
            bgm_sink: None,
            current_bgm_path: None,
            volume: volume.clamp(0.0, 1.0),
            base_path: base_path.as_ref().to_path_buf(),
        })
    }

    /// 停止 BGM
    pub fn stop_bgm(&mut self) {
        if let Some(sink) = self.bgm_sink.take() {
            sink.stop();
            debug!(path = ?self.current_bgm_path, "停止 BGM");
        }
        self.current_bgm_path = None;
    }

    /// 循环播放 BGM
    pub fn play_bgm(&mut self, path: &str) {
        self.stop_bgm();

        let full_path = self.base_path.join(path);
        let file = match File::open(&full_path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %full_path.display(), error = %e, "无法打开音频文件");
                return;
            }
        };

        let source = match Decoder::new(BufReader::new(file)) {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %full_path.display(), error = %e, "无法解码音频文件");
                return;
            }
        };

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source.repeat_infinite());

        info!(path = %full_path.display(), "播放 BGM");
        self.bgm_sink = Some(sink);
        self.current_bgm_path = Some(path.to_string());
    }
}

impl MusicPlayer for AudioManager {
    fn play(&mut self, path: &str) {
        self.play_bgm(path);
    }
}

/// 静音播放器
///
/// 音频被禁用或设备不可用时使用。
#[derive(Debug, Default)]
pub struct NullMusic;

impl MusicPlayer for NullMusic {
    fn play(&mut self, path: &str) {
        debug!(path = path, "音频未启用，忽略 BGM");
    }
}

/// 按配置创建播放器，失败时降级为静音
pub fn create_music_player(
    enabled: bool,
    base_path: impl AsRef<Path>,
    volume: f32,
) -> Box<dyn MusicPlayer> {
    if !enabled {
        info!("音频已在配置中禁用");
        return Box::new(NullMusic);
    }

    match AudioManager::new(base_path, volume) {
        Ok(manager) => Box::new(manager),
        Err(e) => {
            warn!(error = %e, "音频不可用，使用静音模式");
            Box::new(NullMusic)
        }
    }
}
