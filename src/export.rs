use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Context as _;

use crate::{
    error::{FlipbookError, FlipbookResult},
    raster::Bitmap,
};

/// Fixed encoder quality (x264 CRF; lower is better).
const CRF: &str = "18";

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl ExportConfig {
    pub fn validate(&self) -> FlipbookResult<()> {
        if self.fps == 0 {
            return Err(FlipbookError::validation("export fps must be non-zero"));
        }
        Ok(())
    }
}

pub fn default_mp4_config(out_path: impl Into<PathBuf>, fps: u32) -> ExportConfig {
    ExportConfig {
        fps,
        out_path: out_path.into(),
        overwrite: true,
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> FlipbookResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encode the frames to MP4 by writing a sequentially numbered PNG sequence
/// to a scratch directory and handing it to the system `ffmpeg` binary
/// (avoids native FFmpeg dev header/lib requirements).
///
/// The scratch directory is removed no matter the outcome, and a failed
/// encode removes any partial output file, so failure leaves nothing behind.
/// This blocks for the duration of the encode; interactive callers should go
/// through [`export_in_background`].
#[tracing::instrument(skip(frames), fields(frames = frames.len()))]
pub fn export_animation(frames: &[Bitmap], cfg: &ExportConfig) -> FlipbookResult<()> {
    cfg.validate()?;

    if frames.is_empty() {
        return Err(FlipbookError::warning("no frames to export"));
    }
    let (width, height) = frames[0].size();
    for (i, frame) in frames.iter().enumerate() {
        if frame.size() != (width, height) {
            return Err(FlipbookError::validation(format!(
                "frame {i} is {}x{}, expected {width}x{height}",
                frame.width(),
                frame.height()
            )));
        }
    }
    if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
        // We target yuv420p output for maximum player compatibility.
        return Err(FlipbookError::validation(
            "canvas width/height must be even (required for yuv420p mp4 output)",
        ));
    }

    if !cfg.overwrite && cfg.out_path.exists() {
        return Err(FlipbookError::validation(format!(
            "output file '{}' already exists",
            cfg.out_path.display()
        )));
    }

    if !is_ffmpeg_on_path() {
        return Err(FlipbookError::encode(
            "ffmpeg is required for MP4 export, but was not found on PATH",
        ));
    }

    ensure_parent_dir(&cfg.out_path)?;

    let scratch = scratch_dir()?;
    let result = write_sequence_and_encode(frames, cfg, &scratch);
    let _ = std::fs::remove_dir_all(&scratch);
    if result.is_err() {
        let _ = std::fs::remove_file(&cfg.out_path);
    }
    result
}

/// Run the encode on a worker thread so the interactive path is not frozen
/// for its duration. The join result is the single terminal success/failure
/// notification.
pub fn export_in_background(
    frames: Vec<Bitmap>,
    cfg: ExportConfig,
) -> std::thread::JoinHandle<FlipbookResult<()>> {
    std::thread::spawn(move || export_animation(&frames, &cfg))
}

fn scratch_dir() -> FlipbookResult<PathBuf> {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let dir = std::env::temp_dir().join(format!(
        "flipbook-export-{}-{}",
        std::process::id(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create scratch directory '{}'", dir.display()))?;
    Ok(dir)
}

fn write_sequence_and_encode(
    frames: &[Bitmap],
    cfg: &ExportConfig,
    scratch: &Path,
) -> FlipbookResult<()> {
    for (i, frame) in frames.iter().enumerate() {
        let path = scratch.join(format!("frame_{i:04}.png"));
        std::fs::write(&path, frame.encode_png()?)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }

    let pattern = scratch.join("frame_%04d.png");
    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());
    cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
    cmd.args(["-loglevel", "error", "-framerate", &cfg.fps.to_string()])
        .arg("-i")
        .arg(&pattern)
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-crf", CRF])
        .arg(&cfg.out_path);

    let output = cmd.output().map_err(|e| {
        FlipbookError::encode(format!(
            "failed to run ffmpeg (is it installed and on PATH?): {e}"
        ))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FlipbookError::encode(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}
