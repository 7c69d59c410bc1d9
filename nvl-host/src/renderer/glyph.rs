//! # Glyph 模块
//!
//! 背景图片 → 字符帧的纯计算部分。
//!
//! 每个终端单元格对应一个重采样后的像素：
//! - 字形：按亮度分桶选取
//! - 前景色：像素本身的颜色
//! - 背景色：与右侧像素的平方平均混色

use image::RgbImage;

/// 默认字形集合（由浅到深）
pub const DEFAULT_GLYPHS: &str = "▒▓▓█";

/// 字形集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphSet {
    symbols: Vec<char>,
}

impl GlyphSet {
    /// 从字符串创建，空字符串返回 `None`
    pub fn new(symbols: &str) -> Option<Self> {
        let symbols: Vec<char> = symbols.chars().collect();
        if symbols.is_empty() {
            None
        } else {
            Some(Self { symbols })
        }
    }

    /// 字形数量
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// 按亮度选取字形
    pub fn pick(&self, luminance: u8) -> char {
        self.symbols[bucket(luminance, self.symbols.len())]
    }
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_GLYPHS.chars().collect(),
        }
    }
}

/// 单元格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphCell {
    pub glyph: char,
    pub fg: [u8; 3],
    pub bg: [u8; 3],
}

/// BT.601 灰度（定点运算，四舍五入）
pub fn luminance([r, g, b]: [u8; 3]) -> u8 {
    let weighted = 4899 * u32::from(r) + 9617 * u32::from(g) + 1868 * u32::from(b);
    // 权重之和为 1 << 14，结果不超过 255
    ((weighted + 8192) >> 14) as u8
}

/// 亮度分桶：`clamp(floor(l * n / 256), 0, n - 1)`
pub fn bucket(luminance: u8, n: usize) -> usize {
    let index = usize::from(luminance) * n / 256;
    index.min(n.saturating_sub(1))
}

/// 逐通道平方平均：`round(sqrt((a² + b²) / 2))`
pub fn blend(left: [u8; 3], right: [u8; 3]) -> [u8; 3] {
    let mix = |a: u8, b: u8| {
        let (a, b) = (f64::from(a), f64::from(b));
        ((a * a + b * b) / 2.0).sqrt().round() as u8
    };
    [
        mix(left[0], right[0]),
        mix(left[1], right[1]),
        mix(left[2], right[2]),
    ]
}

/// 计算背景绘制区域
///
/// `(min(vw, iw), max(0, min(vh, ih) - tab_height))`
pub fn draw_area(viewport: (u16, u16), image: (u32, u32), tab_height: u16) -> (u16, u16) {
    let (vw, vh) = viewport;
    let (iw, ih) = image;
    let width = u32::from(vw).min(iw) as u16;
    let height = (u32::from(vh).min(ih) as u16).saturating_sub(tab_height);
    (width, height)
}

/// 最近邻重采样：`src = floor(dst * src_len / dst_len)`
pub fn resample(image: &RgbImage, width: u16, height: u16) -> Vec<Vec<[u8; 3]>> {
    let (src_w, src_h) = image.dimensions();
    let (dst_w, dst_h) = (u64::from(width), u64::from(height));

    (0..dst_h)
        .map(|y| {
            let sy = (y * u64::from(src_h) / dst_h) as u32;
            (0..dst_w)
                .map(|x| {
                    let sx = (x * u64::from(src_w) / dst_w) as u32;
                    image.get_pixel(sx, sy).0
                })
                .collect()
        })
        .collect()
}

/// 把像素行转换为单元格行
///
/// 最后一列沿用前一列的混色；只有一列时与自身混色。
pub fn compose_row(pixels: &[[u8; 3]], glyphs: &GlyphSet) -> Vec<GlyphCell> {
    let mut cells: Vec<GlyphCell> = pixels
        .iter()
        .enumerate()
        .map(|(x, &pixel)| {
            let right = pixels.get(x + 1).copied().unwrap_or(pixel);
            GlyphCell {
                glyph: glyphs.pick(luminance(pixel)),
                fg: pixel,
                bg: blend(pixel, right),
            }
        })
        .collect();

    let len = cells.len();
    if len >= 2 {
        cells[len - 1].bg = cells[len - 2].bg;
    }
    cells
}

/// 生成整帧
pub fn compose_frame(
    image: &RgbImage,
    width: u16,
    height: u16,
    glyphs: &GlyphSet,
) -> Vec<Vec<GlyphCell>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    resample(image, width, height)
        .iter()
        .map(|row| compose_row(row, glyphs))
        .collect()
}
