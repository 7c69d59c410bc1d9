//! # Input 模块
//!
//! 终端输入：阻塞等待推进信号，以及终端模式的进入/恢复。
//!
//! ## 按键映射
//!
//! | 按键 | 信号 |
//! |------|------|
//! | `q` / `Esc` / `Ctrl+C` | 退出 |
//! | 其他按键 | 推进 |
//!
//! raw 模式下 Ctrl+C 不会产生 SIGINT，而是作为按键事件到达。

use std::io::{self, Write};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
};
use nvl_runtime::{AdvanceSignal, RuntimeError, Signal};
use tracing::{debug, info, warn};

/// 按键 → 推进信号
///
/// 只处理按下事件，释放/重复事件返回 `None`。
pub fn signal_for_key(key: &KeyEvent) -> Option<Signal> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Signal::Quit);
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Signal::Quit),
        _ => Some(Signal::Advance),
    }
}

/// 终端输入源
#[derive(Debug, Default)]
pub struct TerminalInput;

impl AdvanceSignal for TerminalInput {
    fn wait(&mut self) -> Result<Signal, RuntimeError> {
        loop {
            let event = event::read().map_err(|e| RuntimeError::Input {
                message: e.to_string(),
            })?;
            if let Event::Key(key) = event
                && let Some(signal) = signal_for_key(&key)
            {
                debug!(key = ?key.code, signal = ?signal, "收到按键");
                return Ok(signal);
            }
        }
    }
}

/// 终端模式守卫
///
/// 创建时进入 raw 模式与备用屏幕，drop 时恢复。
/// 致命错误返回 `main` 的途中 drop 同样会恢复终端。
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    /// 进入全屏模式并设置终端标题
    pub fn enter(title: &str) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide, SetTitle(title)) {
            disable_raw_mode().ok();
            return Err(e);
        }
        info!(title = title, "终端进入全屏模式");
        Ok(Self { active: true })
    }

    /// 恢复终端
    fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, Show, LeaveAlternateScreen) {
            warn!(error = %e, "恢复终端屏幕失败");
        }
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "退出 raw 模式失败");
        }
        stdout.flush().ok();
        info!("终端已恢复");
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}
