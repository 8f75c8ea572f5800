//! In-memory model of an indexed-colour animation.
//!
//! Mirrors what a GIF stores: a canvas, an optional global colour table and
//! a list of frames that each cover a sub-rectangle of the canvas.

/// Maximum number of entries a colour table can hold.
pub const MAX_PALETTE_LEN: usize = 256;

/// A colour table of at most 256 RGB entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

impl Palette {
    /// Build a palette, truncating to 256 entries.
    pub fn new(mut colors: Vec<[u8; 3]>) -> Self {
        colors.truncate(MAX_PALETTE_LEN);
        Self { colors }
    }

    /// Build a palette from a packed `RGBRGB...` table as found in GIF files.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
    }

    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flatten().copied().collect()
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.colors.len() >= MAX_PALETTE_LEN
    }

    pub fn get(&self, index: u8) -> Option<[u8; 3]> {
        self.colors.get(index as usize).copied()
    }

    /// Append a colour and return its index, or `None` when the table is full.
    pub fn push(&mut self, color: [u8; 3]) -> Option<u8> {
        if self.is_full() {
            return None;
        }
        self.colors.push(color);
        Some((self.colors.len() - 1) as u8)
    }
}

/// Rectangle of a frame inside the canvas coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameRect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle covering the whole canvas.
    pub fn canvas(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn covers_canvas(&self, canvas_width: u32, canvas_height: u32) -> bool {
        *self == Self::canvas(canvas_width, canvas_height)
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Disposal method applied after a frame is shown. Passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposal {
    #[default]
    Any,
    Keep,
    Background,
    Previous,
}

/// Animation loop count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    #[default]
    Infinite,
    Finite(u16),
}

/// One indexed-colour frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Row-major palette indices, `rect.width * rect.height` long.
    pub pixels: Vec<u8>,
    /// Local colour table. `None` means the image-wide palette applies.
    pub palette: Option<Palette>,
    pub transparent: Option<u8>,
    pub rect: FrameRect,
    /// Delay in hundredths of a second.
    pub delay: u16,
    pub disposal: Disposal,
    pub interlaced: bool,
}

impl Frame {
    /// A frame filled with a single index.
    pub fn filled(rect: FrameRect, index: u8) -> Self {
        Self {
            pixels: vec![index; rect.area()],
            palette: None,
            transparent: None,
            rect,
            delay: 0,
            disposal: Disposal::Any,
            interlaced: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.rect.width
    }

    pub fn height(&self) -> u32 {
        self.rect.height
    }

    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y * self.rect.width + x) as usize]
    }

    /// The palette this frame is drawn with: its own, or the image-wide one.
    pub fn effective_palette<'a>(&'a self, global: Option<&'a Palette>) -> Option<&'a Palette> {
        self.palette.as_ref().or(global)
    }
}

/// A decoded animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimatedImage {
    pub width: u32,
    pub height: u32,
    pub global_palette: Option<Palette>,
    pub background_index: u8,
    pub loop_count: LoopCount,
    pub frames: Vec<Frame>,
}

impl AnimatedImage {
    pub fn new(width: u32, height: u32, frames: Vec<Frame>) -> Self {
        Self {
            width,
            height,
            global_palette: None,
            background_index: 0,
            loop_count: LoopCount::Infinite,
            frames,
        }
    }

    /// Largest frame width and height.
    pub fn max_frame_bounds(&self) -> (u32, u32) {
        self.frames.iter().fold((0, 0), |(w, h), frame| {
            (w.max(frame.width()), h.max(frame.height()))
        })
    }

    /// Resize the canvas to fit the largest frame.
    pub fn recompute_canvas(&mut self) {
        let (width, height) = self.max_frame_bounds();
        self.width = width;
        self.height = height;
    }
}
