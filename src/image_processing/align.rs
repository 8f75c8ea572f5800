use super::model::{Frame, FrameRect, Palette, MAX_PALETTE_LEN};
use super::quantize::nearest_index;

/// Result of aligning a frame to the canvas.
#[derive(Debug)]
pub enum Aligned<'a> {
    /// The frame already covered the whole canvas.
    Unchanged(&'a Frame),
    /// The frame was composited onto a transparent canvas-sized background.
    Padded(Frame),
}

impl Aligned<'_> {
    pub fn frame(&self) -> &Frame {
        match self {
            Self::Unchanged(frame) => frame,
            Self::Padded(frame) => frame,
        }
    }

    pub fn was_padded(&self) -> bool {
        matches!(self, Self::Padded(_))
    }
}

/// Normalize a frame so it spans `(0, 0)-(canvas_width, canvas_height)`.
///
/// Partial frames (only the changed region of an animation) are placed at
/// their offset on a fully transparent background; anything outside the
/// canvas is clipped.
pub fn align_to_canvas<'a>(
    frame: &'a Frame,
    global_palette: Option<&Palette>,
    canvas_width: u32,
    canvas_height: u32,
) -> Aligned<'a> {
    if frame.rect.covers_canvas(canvas_width, canvas_height) {
        return Aligned::Unchanged(frame);
    }

    let (palette, transparent, source) = reserve_transparent_index(frame, global_palette);
    let source = source.as_deref().unwrap_or(&frame.pixels);

    let rect = FrameRect::canvas(canvas_width, canvas_height);
    let mut pixels = vec![transparent; rect.area()];

    let FrameRect {
        left,
        top,
        width,
        height,
    } = frame.rect;
    for y in 0..height {
        let dst_y = top + y;
        if dst_y >= canvas_height {
            break;
        }
        for x in 0..width {
            let dst_x = left + x;
            if dst_x >= canvas_width {
                break;
            }
            let index = source[(y * width + x) as usize];
            // Source-over: a transparent source pixel leaves the background visible.
            if Some(index) != frame.transparent {
                pixels[(dst_y * canvas_width + dst_x) as usize] = index;
            }
        }
    }

    Aligned::Padded(Frame {
        pixels,
        palette,
        transparent: Some(transparent),
        rect,
        delay: frame.delay,
        disposal: frame.disposal,
        interlaced: frame.interlaced,
    })
}

/// Pick the index the padded background is filled with.
///
/// Returns the frame's (possibly extended) local palette, the transparent index
/// and, when pixels had to be remapped to free an index, the remapped pixels.
fn reserve_transparent_index(
    frame: &Frame,
    global_palette: Option<&Palette>,
) -> (Option<Palette>, u8, Option<Vec<u8>>) {
    if let Some(transparent) = frame.transparent {
        return (frame.palette.clone(), transparent, None);
    }

    let effective = frame.effective_palette(global_palette).cloned().unwrap_or_default();

    if !effective.is_full() {
        let mut extended = effective.clone();
        if let Some(index) = extended.push([0, 0, 0]) {
            return (Some(extended), index, None);
        }
    }

    let mut usage = [0usize; MAX_PALETTE_LEN];
    for &index in &frame.pixels {
        usage[index as usize] += 1;
    }

    if let Some(unused) = usage.iter().position(|&count| count == 0) {
        return (frame.palette.clone(), unused as u8, None);
    }

    // Every slot is in use: give up the rarest colour.
    let rarest = usage
        .iter()
        .enumerate()
        .min_by_key(|&(_, count)| *count)
        .map(|(index, _)| index as u8)
        .unwrap_or(0);
    let replacement = effective
        .get(rarest)
        .and_then(|color| nearest_index(color, &effective, Some(rarest)))
        .unwrap_or(0);
    let remapped = frame
        .pixels
        .iter()
        .map(|&index| if index == rarest { replacement } else { index })
        .collect();

    (frame.palette.clone(), rarest, Some(remapped))
}
