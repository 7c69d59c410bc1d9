//! # 场景播放集成测试
//!
//! 测试 SceneStore → ScriptHost → RenderPipeline → SaveStore 的完整链路。
//! 使用临时目录中的真实场景、Lua 脚本和存档文件；
//! 输入与终端输出由内存实现替代，不依赖真实的终端/音频设备。

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use image::{Rgb, RgbImage};
use nvl_host::app::{self, StartMode};
use nvl_host::renderer::Viewport;
use nvl_host::scene_store;
use nvl_host::{AppConfig, SaveStore};
use nvl_runtime::{
    AdvanceSignal, ChoiceValue, Phase, RenderError, RunSummary, RuntimeError, RuntimeResult,
    ScriptError, Signal,
};
use tempfile::TempDir;

/// 共享的输出缓冲
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 按预设序列返回信号，用完后一直推进
struct ScriptedInput {
    signals: VecDeque<Signal>,
    waits: Rc<Cell<usize>>,
}

impl AdvanceSignal for ScriptedInput {
    fn wait(&mut self) -> Result<Signal, RuntimeError> {
        self.waits.set(self.waits.get() + 1);
        Ok(self.signals.pop_front().unwrap_or(Signal::Advance))
    }
}

/// 临时小说目录
struct Novel {
    dir: TempDir,
    config: AppConfig,
    output: SharedBuffer,
    waits: Rc<Cell<usize>>,
}

impl Novel {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("scenes")).unwrap();
        fs::create_dir_all(dir.path().join("scripts")).unwrap();
        fs::create_dir_all(dir.path().join("bg")).unwrap();

        let mut config = AppConfig {
            novel_name: "测试小说".to_string(),
            scene_directory: "scenes".into(),
            save_path: "saves/save.json".into(),
            assets_root: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        config.audio.enabled = false;
        config.validate().unwrap();

        Self {
            dir,
            config,
            output: SharedBuffer::default(),
            waits: Rc::new(Cell::new(0)),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn scene(&self, id: u32, text: &str, script: Option<&str>) {
        let mut json = serde_json::json!({
            "id": id,
            "text": text,
            "person": "Alice",
            "background": "bg/white.png",
        });
        if let Some(source) = script {
            let path = format!("scripts/{id}.lua");
            fs::write(self.root().join(&path), source).unwrap();
            json["script"] = path.into();
        }
        fs::write(
            self.root().join(format!("scenes/{id}.json")),
            json.to_string(),
        )
        .unwrap();
    }

    fn white_background(&self) {
        RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]))
            .save(self.root().join("bg/white.png"))
            .unwrap();
    }

    fn write_save(&self, content: &str) {
        let path = self.config.save_full_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn store(&self) -> SaveStore {
        SaveStore::new(self.config.save_full_path())
    }

    fn play(&self, mode: StartMode, signals: &[Signal]) -> RuntimeResult<RunSummary> {
        let scenes = scene_store::load(self.config.scene_dir_full_path()).unwrap();
        let input = ScriptedInput {
            signals: signals.iter().copied().collect(),
            waits: Rc::clone(&self.waits),
        };
        let host = app::create_collaborators(
            &self.config,
            self.output.clone(),
            Viewport::Fixed(40, 12),
            Box::new(input),
        )
        .unwrap();

        let mut runtime = app::start_runtime(scenes, host, mode)?;
        runtime.run()
    }
}

/// 测试完整播放：脚本修改、选项跨场景保留、存档覆盖
#[test]
fn test_full_playback() {
    let novel = Novel::new();
    novel.white_background();
    novel.scene(
        1,
        "原文",
        Some(
            r#"
            function modify_scene(scene)
                scene.add_choice("visited_one", true)
                return { text = "改写后的第一幕" }
            end
            "#,
        ),
    );
    novel.scene(2, "第二幕", None);
    novel.scene(3, "终幕", None);

    let summary = novel.play(StartMode::Resume, &[]).unwrap();
    assert_eq!(summary.visited, vec![1, 2, 3]);
    assert_eq!(summary.phase, Phase::Finished);
    assert_eq!(novel.waits.get(), 3);

    let output = novel.output.contents();
    assert!(output.contains("改写后的第一幕"));
    assert!(!output.contains("原文"));
    assert!(output.contains("Scene 3"));
    assert!(output.contains('█'));

    // 最后一次存档发生在进入第三幕时
    let saved = novel.store().read().unwrap();
    assert_eq!(saved.id, 3);
    assert_eq!(saved.text, "终幕");
    assert_eq!(
        saved.choices.get("visited_one"),
        Some(&ChoiceValue::Bool(true))
    );
}

/// 测试读档：从存档场景继续，且不执行该场景的脚本
#[test]
fn test_resume_skips_restored_script() {
    let novel = Novel::new();
    novel.scene(1, "一", None);
    novel.scene(
        2,
        "二",
        Some(r#"function modify_scene(scene) scene.add_choice("scene_two_script", true) end"#),
    );
    novel.scene(3, "三", None);
    novel.write_save(
        r#"{"id": 2, "text": "二", "background": "bg/white.png", "person": "Alice", "music": "", "choices": {"gold": 5}}"#,
    );

    let summary = novel.play(StartMode::Resume, &[]).unwrap();
    assert_eq!(summary.visited, vec![2, 3]);

    let saved = novel.store().read().unwrap();
    assert_eq!(saved.id, 3);
    assert_eq!(saved.choices.get("gold"), Some(&ChoiceValue::Int(5)));
    assert!(!saved.choices.contains_key("scene_two_script"));
}

/// 测试损坏存档：可抢救时从存档场景继续，选项清空
#[test]
fn test_corrupt_save_salvaged() {
    let novel = Novel::new();
    for id in 1..=3 {
        novel.scene(id, "文本", None);
    }
    novel.write_save(r#"{"id": 2, "text": "半截", "choices": "broken"}"#);

    let summary = novel.play(StartMode::Resume, &[]).unwrap();
    assert_eq!(summary.visited, vec![2, 3]);
    assert!(novel.store().read().unwrap().choices.is_empty());
}

/// 测试损坏存档：无法抢救时从头开始
#[test]
fn test_corrupt_save_starts_fresh() {
    let novel = Novel::new();
    for id in 1..=3 {
        novel.scene(id, "文本", None);
    }
    novel.write_save(r#"{"id": 2, "choices": {"gold": [1, 2"#);

    let summary = novel.play(StartMode::Resume, &[]).unwrap();
    assert_eq!(summary.visited, vec![1, 2, 3]);
    assert_eq!(summary.phase, Phase::Finished);
}

/// 测试 --fresh 与 --scene
#[test]
fn test_fresh_and_jump_ignore_save() {
    let novel = Novel::new();
    for id in 1..=3 {
        novel.scene(id, "文本", None);
    }
    novel.write_save(
        r#"{"id": 3, "text": "", "background": "", "person": "", "music": "", "choices": {}}"#,
    );

    let summary = novel.play(StartMode::Fresh, &[]).unwrap();
    assert_eq!(summary.visited, vec![1, 2, 3]);

    let summary = novel.play(StartMode::At(99), &[]).unwrap();
    assert_eq!(summary.visited, vec![3]);

    let summary = novel.play(StartMode::At(-4), &[]).unwrap();
    assert_eq!(summary.visited, vec![1, 2, 3]);
}

/// 测试玩家退出：停在当前场景，存档保留当前进度
#[test]
fn test_quit_stops_playback() {
    let novel = Novel::new();
    for id in 1..=3 {
        novel.scene(id, "文本", None);
    }

    let summary = novel
        .play(StartMode::Fresh, &[Signal::Advance, Signal::Quit])
        .unwrap();
    assert_eq!(summary.visited, vec![1, 2]);
    assert_eq!(summary.phase, Phase::Stopped);
    assert_eq!(novel.store().read().unwrap().id, 2);
}

/// 测试 await_input = false 跳过本周期的等待
#[test]
fn test_skip_input_for_one_cycle() {
    let novel = Novel::new();
    novel.scene(
        1,
        "自动前进",
        Some(r#"function post_scene(scene) return { await_input = false } end"#),
    );
    novel.scene(2, "二", None);
    novel.scene(3, "三", None);

    let summary = novel.play(StartMode::Fresh, &[]).unwrap();
    assert_eq!(summary.visited, vec![1, 2, 3]);
    assert_eq!(novel.waits.get(), 2);
}

/// 测试删除不存在的选项是致命错误
#[test]
fn test_delete_missing_choice_aborts() {
    let novel = Novel::new();
    novel.scene(
        1,
        "一",
        Some(r#"function post_scene(scene) pcall(scene.delete_choice, "nope") end"#),
    );
    novel.scene(2, "二", None);

    let err = novel.play(StartMode::Fresh, &[]).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Script(ScriptError::MissingChoice { ref name, .. }) if name == "nope"
    ));
}

/// 测试背景图片损坏是致命错误，缺失则跳过
#[test]
fn test_background_failures() {
    let novel = Novel::new();
    novel.scene(1, "一", None);
    novel.scene(2, "二", None);

    // 缺失：正常播放
    let summary = novel.play(StartMode::Fresh, &[]).unwrap();
    assert_eq!(summary.phase, Phase::Finished);

    // 损坏：终止
    fs::write(novel.root().join("bg/white.png"), b"garbage").unwrap();
    let err = novel.play(StartMode::Fresh, &[]).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Render(RenderError::CorruptImage { .. })
    ));
}
