use kurbo::Point;

use crate::{
    draw, fill,
    error::FlipbookResult,
    history::HistoryStack,
    raster::{Bitmap, Rgba8},
};

/// Closed set of drawing tools. Dispatch is exhaustive, so growing or
/// shrinking the toolbox is a compile-time-checked change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Pen,
    Eraser,
    Fill,
    GradientFill,
}

/// The single live, currently-editable bitmap plus tool state.
///
/// Pointer input arrives in device space as fractional [`Point`]s; when the
/// surface is displayed scaled relative to its backing store, coordinates are
/// remapped here before any pixel is touched. A history snapshot is taken
/// once per user-visible action (stroke begin, clear, resize), never during
/// the action, so undo reverts the most recent completed action as a whole.
pub struct PixelSurface {
    bitmap: Bitmap,
    history: HistoryStack,
    tool: Tool,
    brush_size: u32,
    brush_color: Rgba8,
    eraser_size: u32,
    gradient_start: Rgba8,
    gradient_end: Rgba8,
    background: Rgba8,
    /// Displayed size when it differs from the backing size.
    display_size: Option<(u32, u32)>,
    /// Last backing-space point of the active stroke; `Some` only while a
    /// stroke is in progress.
    stroke: Option<(i64, i64)>,
    dirty: bool,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> FlipbookResult<Self> {
        let background = Rgba8::WHITE;
        Ok(Self {
            bitmap: Bitmap::new(width, height, background)?,
            history: HistoryStack::new(),
            tool: Tool::Pen,
            brush_size: 3,
            brush_color: Rgba8::BLACK,
            eraser_size: 10,
            gradient_start: Rgba8::BLACK,
            gradient_end: Rgba8::WHITE,
            background,
            display_size: None,
            stroke: None,
            dirty: false,
        })
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Independent copy of the live bitmap; caller mutation never feeds back.
    pub fn get(&self) -> Bitmap {
        self.bitmap.clone()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.max(1);
    }

    pub fn set_brush_color(&mut self, color: Rgba8) {
        self.brush_color = color;
    }

    pub fn set_eraser_size(&mut self, size: u32) {
        self.eraser_size = size.max(1);
    }

    pub fn set_gradient_colors(&mut self, start: Rgba8, end: Rgba8) {
        self.gradient_start = start;
        self.gradient_end = end;
    }

    pub fn background(&self) -> Rgba8 {
        self.background
    }

    /// Displayed size of the surface, when scaled. `None` means the display
    /// matches the backing store 1:1 and pointer coordinates pass through.
    pub fn set_display_size(&mut self, size: Option<(u32, u32)>) {
        self.display_size = match size {
            Some((w, h)) if (w, h) != self.bitmap.size() => Some((w, h)),
            _ => None,
        };
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// Map a device-space pointer position into backing-store pixel
    /// coordinates, truncating toward zero.
    fn map_to_backing(&self, p: Point) -> (i64, i64) {
        match self.display_size {
            Some((dw, dh)) if dw > 0 && dh > 0 => {
                let (bw, bh) = self.bitmap.size();
                (
                    (p.x * f64::from(bw) / f64::from(dw)) as i64,
                    (p.y * f64::from(bh) / f64::from(dh)) as i64,
                )
            }
            _ => (p.x as i64, p.y as i64),
        }
    }

    /// Pointer-down: opens the edit transaction. The pre-mutation snapshot
    /// happens here, before any pixel changes.
    pub fn begin_stroke(&mut self, p: Point) {
        if self.stroke.is_some() {
            return;
        }
        self.history.snapshot(&self.bitmap);
        self.stroke = Some(self.map_to_backing(p));
    }

    /// Pointer-move sample while the button is held.
    pub fn continue_stroke(&mut self, p: Point) {
        let Some(last) = self.stroke else {
            return;
        };
        let next = self.map_to_backing(p);
        match self.tool {
            Tool::Pen => {
                draw::stroke_segment(&mut self.bitmap, last, next, self.brush_size, self.brush_color);
                self.dirty = true;
            }
            Tool::Eraser => {
                // Erasing is painting with the background color.
                draw::stroke_segment(&mut self.bitmap, last, next, self.eraser_size, self.background);
                self.dirty = true;
            }
            Tool::Fill | Tool::GradientFill => {}
        }
        self.stroke = Some(next);
    }

    /// Pointer-up: draws the final segment (so a click with no intermediate
    /// move still marks the canvas) or triggers the fill, then closes the
    /// transaction.
    pub fn end_stroke(&mut self, p: Point) {
        let Some(last) = self.stroke else {
            return;
        };
        let next = self.map_to_backing(p);
        match self.tool {
            Tool::Pen => {
                draw::stroke_segment(&mut self.bitmap, last, next, self.brush_size, self.brush_color);
                self.dirty = true;
            }
            Tool::Eraser => {
                draw::stroke_segment(&mut self.bitmap, last, next, self.eraser_size, self.background);
                self.dirty = true;
            }
            Tool::Fill => {
                fill::flood_fill(&mut self.bitmap, next, self.brush_color);
                self.dirty = true;
            }
            Tool::GradientFill => {
                fill::gradient_fill(&mut self.bitmap, next, self.gradient_start, self.gradient_end);
                self.dirty = true;
            }
        }
        self.stroke = None;
    }

    pub fn clear(&mut self) {
        self.history.snapshot(&self.bitmap);
        self.bitmap.fill(self.background);
        self.dirty = true;
    }

    /// Re-allocate the backing store at a new size, keeping existing content
    /// anchored at the top-left corner. Same-size requests are a no-op.
    pub fn resize(&mut self, width: u32, height: u32) -> FlipbookResult<()> {
        if (width, height) == self.bitmap.size() {
            return Ok(());
        }
        let resized = self.bitmap.with_canvas_size(width, height, self.background)?;
        self.history.snapshot(&self.bitmap);
        self.bitmap = resized;
        self.dirty = true;
        Ok(())
    }

    /// Replace the live bitmap wholesale, e.g. when a different frame is
    /// selected. History belongs to the previous content and is discarded.
    pub fn load(&mut self, bitmap: Bitmap) {
        self.bitmap = bitmap;
        self.history.clear();
        self.stroke = None;
        self.dirty = true;
    }

    pub fn undo(&mut self) {
        if let Some(previous) = self.history.undo(&self.bitmap) {
            self.bitmap = previous;
            self.dirty = true;
        }
    }

    pub fn redo(&mut self) {
        if let Some(next) = self.history.redo(&self.bitmap) {
            self.bitmap = next;
            self.dirty = true;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Redraw hint for the embedding view; reading it resets it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
