use std::{path::Path, time::Duration};

use crate::{
    error::{FlipbookError, FlipbookResult},
    export::{self, ExportConfig},
    playback::Playback,
    project,
    raster::Bitmap,
    sequence::FrameSequence,
    surface::PixelSurface,
};

/// Ties the live surface, the frame sequence, and the playback scheduler
/// together and enforces the commit protocol between them: on every
/// frame-changing action the live bitmap is committed into the slot being
/// left before the next slot's bitmap is loaded.
///
/// Everything here runs on one control thread, driven by discrete input
/// events; the host arms a timer at [`Editor::tick_interval`] while playing
/// and calls [`Editor::tick`] on each firing. Structural operations
/// implicitly stop playback first, so a tick can never interleave with a
/// mutation. Only the export encode runs off this thread.
pub struct Editor {
    surface: PixelSurface,
    sequence: FrameSequence,
    playback: Playback,
}

impl Editor {
    pub fn new(width: u32, height: u32, fps: u32) -> FlipbookResult<Self> {
        let sequence = FrameSequence::new(width, height, fps)?;
        let mut surface = PixelSurface::new(width, height)?;
        surface.load(first_frame(&sequence)?);
        Ok(Self {
            surface,
            sequence,
            playback: Playback::new(),
        })
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    /// Mutable access for drawing input; strokes go straight to the surface.
    pub fn surface_mut(&mut self) -> &mut PixelSurface {
        &mut self.surface
    }

    pub fn sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    pub fn fps(&self) -> u32 {
        self.sequence.fps()
    }

    pub fn set_fps(&mut self, fps: u32) -> FlipbookResult<()> {
        self.sequence.set_fps(fps)
    }

    /// Commit the live bitmap into the current slot without any structural
    /// change, e.g. after a stroke so thumbnails stay fresh.
    pub fn update_current_frame(&mut self) {
        let live = self.surface.get();
        self.sequence.commit_current(&live);
    }

    pub fn add_frame(&mut self) -> FlipbookResult<()> {
        self.stop_if_playing();
        let live = self.surface.get();
        let blank = self.sequence.add_frame(&live)?;
        self.surface.load(blank);
        Ok(())
    }

    pub fn duplicate_frame(&mut self) {
        self.stop_if_playing();
        let live = self.surface.get();
        let copy = self.sequence.duplicate_current(&live);
        self.surface.load(copy);
    }

    /// Deliberately discards edits on the deleted slot: the live bitmap is
    /// not committed first.
    pub fn delete_frame(&mut self) -> FlipbookResult<()> {
        self.stop_if_playing();
        let next = self.sequence.delete_current()?;
        self.surface.load(next);
        Ok(())
    }

    pub fn move_frame_left(&mut self) {
        self.stop_if_playing();
        let live = self.surface.get();
        self.sequence.move_left(&live);
    }

    pub fn move_frame_right(&mut self) {
        self.stop_if_playing();
        let live = self.surface.get();
        self.sequence.move_right(&live);
    }

    pub fn select_frame(&mut self, index: usize) -> FlipbookResult<()> {
        self.stop_if_playing();
        let live = self.surface.get();
        let next = self.sequence.select(index, &live)?;
        self.surface.load(next);
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Timer period the host should use while playing.
    pub fn tick_interval(&self) -> Duration {
        Playback::tick_interval(self.sequence.fps())
    }

    /// Start the preview: commits the live bitmap, then shows frame 0.
    /// Returns the shown index, or `None` when already playing.
    pub fn play(&mut self) -> Option<usize> {
        if self.playback.is_playing() {
            return None;
        }
        let live = self.surface.get();
        self.sequence.commit_current(&live);
        let (index, frame) = self.playback.play(&self.sequence)?;
        self.surface.load(frame);
        Some(index)
    }

    /// Advance the preview one frame; the frame is loaded read-only into the
    /// surface. Returns the shown index, or `None` when not playing.
    pub fn tick(&mut self) -> Option<usize> {
        let (index, frame) = self.playback.tick(&self.sequence)?;
        self.surface.load(frame);
        Some(index)
    }

    /// Stop the preview and restore the frame selected before `play`.
    pub fn stop(&mut self) -> Option<usize> {
        let (index, frame) = self.playback.stop(&self.sequence)?;
        self.surface.load(frame);
        Some(index)
    }

    fn stop_if_playing(&mut self) {
        if self.playback.is_playing() {
            self.stop();
        }
    }

    pub fn save_project(&mut self, path: &Path) -> FlipbookResult<()> {
        self.stop_if_playing();
        self.update_current_frame();
        project::save_project(path, &self.sequence)
    }

    /// Replace the whole editing state with a loaded project. Nothing is
    /// applied unless the load fully succeeds.
    pub fn load_project(&mut self, path: &Path) -> FlipbookResult<()> {
        self.stop_if_playing();
        let sequence = project::load_project(path)?;
        let first = first_frame(&sequence)?;
        self.sequence = sequence;
        self.surface.load(first);
        Ok(())
    }

    /// Blocking MP4 export of the committed frames.
    pub fn export_animation(&mut self, out_path: &Path) -> FlipbookResult<()> {
        let (frames, cfg) = self.prepare_export(out_path);
        export::export_animation(&frames, &cfg)
    }

    /// Off-thread MP4 export; join the handle for the terminal result.
    pub fn export_animation_in_background(
        &mut self,
        out_path: &Path,
    ) -> std::thread::JoinHandle<FlipbookResult<()>> {
        let (frames, cfg) = self.prepare_export(out_path);
        export::export_in_background(frames, cfg)
    }

    fn prepare_export(&mut self, out_path: &Path) -> (Vec<Bitmap>, ExportConfig) {
        self.stop_if_playing();
        self.update_current_frame();
        let frames: Vec<Bitmap> = self.sequence.frames().cloned().collect();
        (frames, export::default_mp4_config(out_path, self.sequence.fps()))
    }
}

fn first_frame(sequence: &FrameSequence) -> FlipbookResult<Bitmap> {
    sequence
        .frame(0)
        .cloned()
        .ok_or_else(|| FlipbookError::validation("frame sequence has no frames"))
}
