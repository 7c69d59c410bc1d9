//! # Surface 模块
//!
//! 基于 crossterm 的输出面。命令先排队，每帧结束时统一 flush。

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};

use super::glyph::GlyphCell;
use super::panel::PanelLayout;

/// 视口尺寸来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    /// 每帧查询当前终端尺寸
    Terminal,
    /// 固定尺寸（列, 行）
    Fixed(u16, u16),
}

impl Viewport {
    /// 当前尺寸 `(宽, 高)`
    pub fn size(&self) -> io::Result<(u16, u16)> {
        match *self {
            Viewport::Terminal => terminal::size(),
            Viewport::Fixed(width, height) => Ok((width, height)),
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

/// 输出面
pub struct Surface<W: Write> {
    out: W,
}

impl<W: Write> Surface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// 底层 writer
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// 清屏
    pub fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))
    }

    /// 从第 0 行开始绘制背景帧
    pub fn draw_frame(&mut self, rows: &[Vec<GlyphCell>]) -> io::Result<()> {
        for (y, row) in rows.iter().enumerate() {
            queue!(self.out, MoveTo(0, y as u16))?;
            for cell in row {
                queue!(
                    self.out,
                    SetForegroundColor(rgb(cell.fg)),
                    SetBackgroundColor(rgb(cell.bg)),
                    Print(cell.glyph)
                )?;
            }
            queue!(self.out, ResetColor)?;
        }
        Ok(())
    }

    /// 在指定行绘制文本面板
    pub fn draw_panel(&mut self, top: u16, panel: &PanelLayout, border: [u8; 3]) -> io::Result<()> {
        let border = rgb(border);

        queue!(
            self.out,
            MoveTo(0, top),
            SetForegroundColor(border),
            Print(&panel.top),
            ResetColor
        )?;

        for (i, line) in panel.lines.iter().enumerate() {
            queue!(
                self.out,
                MoveTo(0, top.saturating_add(1 + i as u16)),
                SetForegroundColor(border),
                Print('│'),
                ResetColor,
                Print(format!(" {} ", line)),
                SetForegroundColor(border),
                Print('│'),
                ResetColor
            )?;
        }

        let bottom_row = top.saturating_add(panel.height() - 1);
        queue!(
            self.out,
            MoveTo(0, bottom_row),
            SetForegroundColor(border),
            Print(&panel.bottom),
            ResetColor
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
