//! # Renderer 模块
//!
//! 把 `RuntimeState` 画到终端：背景字符帧 + 文本面板。
//!
//! ## 渲染流程
//!
//! 1. 清屏
//! 2. 背景：解码 → 计算绘制区域 → 最近邻重采样 → 字形/混色 → 逐行输出
//! 3. `show_tab` 为 true 时在背景下方绘制文本面板
//! 4. flush
//!
//! 背景高度扣除的是**上一次**面板的高度（首帧使用配置的初始值），
//! 本次面板的高度在下一帧才生效。

pub mod glyph;
pub mod panel;
pub mod surface;

use std::io::Write;
use std::path::{Path, PathBuf};

use nvl_runtime::{RenderError, RuntimeState, SceneRenderer};
use tracing::{debug, warn};

pub use glyph::{GlyphCell, GlyphSet};
pub use panel::PanelLayout;
pub use surface::{Surface, Viewport};

/// 渲染管线
pub struct RenderPipeline<W: Write> {
    surface: Surface<W>,
    viewport: Viewport,
    glyphs: GlyphSet,
    border_color: [u8; 3],
    /// 背景图片相对路径的解析根目录
    assets_root: PathBuf,
    /// 上一次面板的高度
    tab_height: u16,
}

impl<W: Write> RenderPipeline<W> {
    /// 创建渲染管线
    pub fn new(
        out: W,
        viewport: Viewport,
        glyphs: GlyphSet,
        assets_root: impl AsRef<Path>,
        initial_tab_height: u16,
    ) -> Self {
        Self {
            surface: Surface::new(out),
            viewport,
            glyphs,
            border_color: [255, 255, 255],
            assets_root: assets_root.as_ref().to_path_buf(),
            tab_height: initial_tab_height,
        }
    }

    /// 设置面板边框颜色
    pub fn with_border_color(mut self, color: [u8; 3]) -> Self {
        self.border_color = color;
        self
    }

    /// 下一帧背景将扣除的面板高度
    pub fn tab_height(&self) -> u16 {
        self.tab_height
    }

    /// 底层 writer
    pub fn writer(&self) -> &W {
        self.surface.writer()
    }

    /// 绘制背景，返回绘制的行数
    ///
    /// 图片不存在时跳过；存在但无法解码时返回错误。
    fn draw_background(&mut self, background: &str, viewport: (u16, u16)) -> Result<u16, RenderError> {
        let path = self.assets_root.join(background);
        if !path.is_file() {
            warn!(path = %path.display(), "背景图片不存在，跳过");
            return Ok(0);
        }

        let image = image::open(&path)
            .map_err(|e| RenderError::CorruptImage {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
            .to_rgb8();

        let (width, height) = glyph::draw_area(viewport, image.dimensions(), self.tab_height);
        debug!(
            path = %path.display(),
            width = width,
            height = height,
            tab_height = self.tab_height,
            "绘制背景"
        );

        let frame = glyph::compose_frame(&image, width, height, &self.glyphs);
        self.surface.draw_frame(&frame)?;
        Ok(height)
    }
}

impl<W: Write> SceneRenderer for RenderPipeline<W> {
    fn render(&mut self, state: &RuntimeState) -> Result<(), RenderError> {
        let viewport = self.viewport.size()?;
        debug!(scene = state.id, width = viewport.0, height = viewport.1, "渲染场景");

        self.surface.clear()?;
        let rows = self.draw_background(&state.background, viewport)?;

        if state.show_tab {
            match PanelLayout::new(state.id, &state.text, &state.person, viewport.0) {
                Some(panel) => {
                    self.surface.draw_panel(rows, &panel, self.border_color)?;
                    self.tab_height = panel.height();
                }
                None => warn!(width = viewport.0, "视口过窄，跳过文本面板"),
            }
        }

        self.surface.flush()?;
        Ok(())
    }
}
