use crate::{
    error::{FlipbookError, FlipbookResult},
    raster::{Bitmap, Rgba8},
};

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;

/// Ordered collection of committed frames plus a cursor.
///
/// The sequence never reaches into the editing surface: every operation that
/// could orphan unsaved edits takes the live bitmap as a parameter and
/// commits it into the cursor's slot first, and every operation that changes
/// which frame is current returns an independent copy for the caller to load.
/// Frames are deep copies throughout; no slot shares storage with another
/// slot or with the live surface.
///
/// There is always at least one frame; construction creates a blank one.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Vec<Bitmap>,
    current: usize,
    fps: u32,
    width: u32,
    height: u32,
    background: Rgba8,
}

impl FrameSequence {
    pub fn new(width: u32, height: u32, fps: u32) -> FlipbookResult<Self> {
        validate_fps(fps)?;
        let background = Rgba8::WHITE;
        let first = Bitmap::new(width, height, background)?;
        Ok(Self {
            frames: vec![first],
            current: 0,
            fps,
            width,
            height,
            background,
        })
    }

    /// Rebuild from frames loaded out of a project container. The cursor
    /// lands on frame 0. Empty input gets one blank frame so the ≥1 frame
    /// invariant holds even when every stored frame was unreadable.
    pub fn from_frames(
        width: u32,
        height: u32,
        fps: u32,
        mut frames: Vec<Bitmap>,
    ) -> FlipbookResult<Self> {
        validate_fps(fps)?;
        let background = Rgba8::WHITE;
        if frames.is_empty() {
            frames.push(Bitmap::new(width, height, background)?);
        }
        Ok(Self {
            frames,
            current: 0,
            fps,
            width,
            height,
            background,
        })
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: u32) -> FlipbookResult<()> {
        validate_fps(fps)?;
        self.fps = fps;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn frame(&self, index: usize) -> Option<&Bitmap> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> impl Iterator<Item = &Bitmap> {
        self.frames.iter()
    }

    /// Write the live bitmap into the cursor's slot. Called before any
    /// structural change so edits on the slot about to be left survive.
    pub fn commit_current(&mut self, live: &Bitmap) {
        self.frames[self.current] = live.clone();
    }

    /// Append a blank frame at the end and select it. Returns the blank
    /// frame's bitmap for the caller to load into the surface.
    pub fn add_frame(&mut self, live: &Bitmap) -> FlipbookResult<Bitmap> {
        self.commit_current(live);
        let blank = Bitmap::new(self.width, self.height, self.background)?;
        self.frames.push(blank.clone());
        self.current = self.frames.len() - 1;
        Ok(blank)
    }

    /// Insert a copy of the current frame immediately after it and select
    /// the copy. Returns the copy for loading.
    pub fn duplicate_current(&mut self, live: &Bitmap) -> Bitmap {
        self.commit_current(live);
        let copy = self.frames[self.current].clone();
        self.current += 1;
        self.frames.insert(self.current, copy.clone());
        copy
    }

    /// Remove the current frame and return the newly selected frame's bitmap
    /// for loading. Refuses to delete the last remaining frame.
    pub fn delete_current(&mut self) -> FlipbookResult<Bitmap> {
        if self.frames.len() <= 1 {
            return Err(FlipbookError::warning("cannot delete the last frame"));
        }
        self.frames.remove(self.current);
        self.current = self.current.min(self.frames.len() - 1);
        Ok(self.frames[self.current].clone())
    }

    /// Swap the current frame with its left neighbor; the selection follows
    /// the moved frame. No-op at index 0.
    pub fn move_left(&mut self, live: &Bitmap) {
        if self.current == 0 {
            return;
        }
        self.commit_current(live);
        self.frames.swap(self.current, self.current - 1);
        self.current -= 1;
    }

    /// Swap the current frame with its right neighbor; the selection follows
    /// the moved frame. No-op at the last index.
    pub fn move_right(&mut self, live: &Bitmap) {
        if self.current + 1 >= self.frames.len() {
            return;
        }
        self.commit_current(live);
        self.frames.swap(self.current, self.current + 1);
        self.current += 1;
    }

    /// Commit the live bitmap into the old slot, move the cursor to `index`,
    /// and return that frame's bitmap for loading.
    pub fn select(&mut self, index: usize, live: &Bitmap) -> FlipbookResult<Bitmap> {
        if index >= self.frames.len() {
            return Err(FlipbookError::validation(format!(
                "frame index {index} out of range (have {})",
                self.frames.len()
            )));
        }
        self.commit_current(live);
        self.current = index;
        Ok(self.frames[index].clone())
    }
}

fn validate_fps(fps: u32) -> FlipbookResult<()> {
    if !(MIN_FPS..=MAX_FPS).contains(&fps) {
        return Err(FlipbookError::validation(format!(
            "fps must be in {MIN_FPS}..={MAX_FPS}, got {fps}"
        )));
    }
    Ok(())
}
