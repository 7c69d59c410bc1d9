//! # Panel 模块
//!
//! 文本面板的排版：
//!
//! ```text
//! ┌───────── Scene 3 ──────────┐
//! │ 门开了，风从走廊吹进来。   │
//! └────────── Alice ───────────┘
//! ```
//!
//! 面板占满视口宽度，正文宽度为 `vw - 4`（边框 + 左右各一格留白）。
//! 面板高度 = 行数 + 2，作为下一次渲染预留的高度。
//!
//! 宽度一律按终端显示列计算，CJK 字符占两列。

use unicode_width::UnicodeWidthChar;

/// 可绘制面板的最小视口宽度（正文至少容纳一个双宽字符）
pub const MIN_PANEL_WIDTH: u16 = 6;

/// 面板排版结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    /// 面板总宽度（含边框）
    pub width: u16,
    /// 上边框（居中标题）
    pub top: String,
    /// 正文行（已填充到正文宽度）
    pub lines: Vec<String>,
    /// 下边框（居中说话人）
    pub bottom: String,
}

impl PanelLayout {
    /// 排版
    ///
    /// 视口宽度小于 [`MIN_PANEL_WIDTH`] 时放不下面板，返回 `None`。
    pub fn new(id: u32, text: &str, person: &str, width: u16) -> Option<Self> {
        if width < MIN_PANEL_WIDTH {
            return None;
        }

        let inner = usize::from(width - 4);
        let lines = wrap_text(text, inner)
            .into_iter()
            .map(|line| pad_to(line, inner))
            .collect();

        Some(Self {
            width,
            top: titled_border('┌', &format!("Scene {}", id), '┐', width),
            lines,
            bottom: titled_border('└', person, '┘', width),
        })
    }

    /// 面板高度（含上下边框）
    pub fn height(&self) -> u16 {
        u16::try_from(self.lines.len() + 2).unwrap_or(u16::MAX)
    }
}

/// 文本占用的终端列数
pub fn text_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// 不超过 `width` 列的最长前缀的字节长度
fn prefix_len(text: &str, width: usize) -> usize {
    let mut used = 0;
    for (index, c) in text.char_indices() {
        used += char_width(c);
        if used > width {
            return index;
        }
    }
    text.len()
}

fn pad_to(mut line: String, width: usize) -> String {
    let fill = width.saturating_sub(text_width(&line));
    line.extend(std::iter::repeat_n(' ', fill));
    line
}

/// 按列宽折行
///
/// 每个原始行单独折行，超长单词会被截断到下一行；空文本产生一个空行。
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let width = width.max(1);
    text.lines().flat_map(|line| wrap_line(line, width)).collect()
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split_whitespace() {
        let mut rest = word;
        loop {
            let sep = usize::from(current_width > 0);
            let rest_width = text_width(rest);
            if current_width + sep + rest_width <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(rest);
                current_width += sep + rest_width;
                break;
            }

            if rest_width > width {
                // 超长单词先填满当前行的剩余空间
                let mut split = prefix_len(rest, width.saturating_sub(current_width + sep));
                if split == 0 && current_width == 0 {
                    // 比整行还宽的单个字符独占一行
                    split = rest.chars().next().map_or(rest.len(), char::len_utf8);
                }
                if split > 0 {
                    if sep == 1 {
                        current.push(' ');
                    }
                    current.push_str(&rest[..split]);
                    rest = &rest[split..];
                }
            }
            lines.push(std::mem::take(&mut current));
            current_width = 0;
            if rest.is_empty() {
                break;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// 带居中标题的边框行
fn titled_border(left: char, label: &str, right: char, width: u16) -> String {
    let inner = usize::from(width.saturating_sub(2));
    let label = if label.is_empty() {
        String::new()
    } else {
        let padded = format!(" {} ", label);
        padded[..prefix_len(&padded, inner)].to_string()
    };
    let label_width = text_width(&label);
    let left_fill = (inner - label_width) / 2;
    let right_fill = inner - label_width - left_fill;

    let mut line = String::with_capacity(usize::from(width) * 3);
    line.push(left);
    line.extend(std::iter::repeat_n('─', left_fill));
    line.push_str(&label);
    line.extend(std::iter::repeat_n('─', right_fill));
    line.push(right);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_basic() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_source_lines_separately() {
        assert_eq!(wrap_text("ab\ncd ef", 10), vec!["ab", "cd ef"]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        assert_eq!(wrap_text("abcdefghijkl", 5), vec!["abcde", "fghij", "kl"]);
        // 超长单词先填满当前行
        assert_eq!(wrap_text("ab cdefghij", 5), vec!["ab cd", "efghi", "j"]);
    }

    #[test]
    fn test_wrap_cjk_counts_columns() {
        assert_eq!(wrap_text("门开了风从走廊吹进来", 4), vec!["门开", "了风", "从走", "廊吹", "进来"]);
        // 奇数列宽时双宽字符不会被拆开
        assert_eq!(wrap_text("门开了", 5), vec!["门开", "了"]);
        // 比整行还宽的字符独占一行
        assert_eq!(wrap_text("门开", 1), vec!["门", "开"]);
    }

    #[test]
    fn test_cjk_rows_fit_viewport() {
        let text = "门开了，风从走廊吹进来。门开了，风从走廊吹进来。";
        for width in [19, 20, 33] {
            let panel = PanelLayout::new(1, text, "爱丽丝", width).unwrap();
            let width = usize::from(width);
            assert_eq!(text_width(&panel.top), width);
            assert_eq!(text_width(&panel.bottom), width);
            for line in &panel.lines {
                // 边框 + 两侧留白
                assert_eq!(text_width(line) + 4, width, "row {:?}", line);
            }
        }

        let panel = PanelLayout::new(1, text, "", 20).unwrap();
        assert_eq!(
            panel.lines,
            vec!["门开了，风从走廊", "吹进来。门开了，", "风从走廊吹进来。"]
        );
        assert_eq!(panel.height(), 5);
    }

    #[test]
    fn test_narrow_viewport_has_no_panel() {
        assert!(PanelLayout::new(1, "hi", "Alice", 5).is_none());
        assert!(PanelLayout::new(1, "hi", "Alice", 0).is_none());

        let panel = PanelLayout::new(1, "门开了", "爱丽丝", MIN_PANEL_WIDTH).unwrap();
        assert_eq!(panel.lines, vec!["门", "开", "了"]);
        assert_eq!(panel.bottom, "└ 爱─┘");
        assert!(panel.lines.iter().all(|l| text_width(l) + 4 <= 6));
    }

    #[test]
    fn test_panel_height() {
        let panel = PanelLayout::new(1, "", "", 20).unwrap();
        assert_eq!(panel.height(), 3);

        let panel = PanelLayout::new(1, "one two three four five six", "", 14).unwrap();
        // 正文宽度 10
        assert_eq!(panel.lines.len(), 3);
        assert_eq!(panel.height(), 5);
        assert!(panel.lines.iter().all(|l| l.chars().count() == 10));
    }

    #[test]
    fn test_panel_borders() {
        let panel = PanelLayout::new(3, "hi", "Alice", 21).unwrap();
        assert_eq!(panel.top, "┌───── Scene 3 ─────┐");
        assert_eq!(panel.bottom, "└────── Alice ──────┘");
        assert_eq!(panel.top.chars().count(), 21);

        // 标题按列宽截断
        assert_eq!(titled_border('└', "爱丽丝", '┘', 8), "└ 爱丽─┘");

        let plain = PanelLayout::new(3, "hi", "", 6).unwrap();
        assert_eq!(plain.bottom, "└────┘");
    }
}
