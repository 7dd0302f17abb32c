use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use anyhow::Context as _;

use crate::{
    error::{FlipbookError, FlipbookResult},
    raster::Bitmap,
    sequence::FrameSequence,
};

/// Name of the metadata record inside the archive.
const META_NAME: &str = "project.json";

/// Metadata record stored alongside the per-frame images. `frames` lists the
/// archive entry names positionally, in playback order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ProjectMeta {
    pub fps: u32,
    pub frame_count: usize,
    pub frames: Vec<String>,
    pub canvas_size: CanvasSize,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

fn frame_entry_name(index: usize) -> String {
    format!("frame_{index:04}.png")
}

/// Save the sequence as a project archive: one metadata record plus one PNG
/// per frame. The archive is written to a temporary sibling and renamed into
/// place only on full success, so a failure never leaves a truncated project
/// at `path`.
#[tracing::instrument(skip(sequence))]
pub fn save_project(path: &Path, sequence: &FrameSequence) -> FlipbookResult<()> {
    let tmp = path.with_extension("tmp");
    let result = write_archive(&tmp, sequence).and_then(|()| {
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to move project into '{}'", path.display()))
            .map_err(FlipbookError::from)
    });
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn write_archive(path: &Path, sequence: &FrameSequence) -> FlipbookResult<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create project file '{}'", path.display()))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let (width, height) = sequence.canvas_size();
    let meta = ProjectMeta {
        fps: sequence.fps(),
        frame_count: sequence.len(),
        frames: (0..sequence.len()).map(frame_entry_name).collect(),
        canvas_size: CanvasSize { width, height },
    };

    writer
        .start_file(META_NAME, options)
        .map_err(|e| FlipbookError::io(format!("failed to start '{META_NAME}': {e}")))?;
    let meta_bytes = serde_json::to_vec_pretty(&meta)
        .map_err(|e| FlipbookError::io(format!("failed to serialize project metadata: {e}")))?;
    writer
        .write_all(&meta_bytes)
        .context("failed to write project metadata")?;

    for (index, frame) in sequence.frames().enumerate() {
        let name = frame_entry_name(index);
        writer
            .start_file(&*name, options)
            .map_err(|e| FlipbookError::io(format!("failed to start '{name}': {e}")))?;
        writer
            .write_all(&frame.encode_png()?)
            .with_context(|| format!("failed to write '{name}'"))?;
    }

    writer
        .finish()
        .map_err(|e| FlipbookError::io(format!("failed to finish project archive: {e}")))?;
    Ok(())
}

/// Load a project archive back into a [`FrameSequence`].
///
/// A missing or unparsable metadata record fails the whole load, as does an
/// unopenable archive. An individual unreadable frame entry is skipped with
/// a warning instead; if every frame is lost the sequence comes back with a
/// single blank frame. Nothing is applied until the whole archive has been
/// read and validated.
#[tracing::instrument]
pub fn load_project(path: &Path) -> FlipbookResult<FrameSequence> {
    let file = File::open(path).map_err(|e| {
        FlipbookError::io(format!(
            "failed to open project archive '{}': {e}",
            path.display()
        ))
    })?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| FlipbookError::io(format!("not a readable project archive: {e}")))?;

    let meta: ProjectMeta = {
        let mut entry = archive
            .by_name(META_NAME)
            .map_err(|e| FlipbookError::io(format!("project metadata is missing: {e}")))?;
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| FlipbookError::io(format!("failed to read project metadata: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FlipbookError::io(format!("project metadata is unparsable: {e}")))?
    };

    if meta.frames.len() != meta.frame_count {
        tracing::warn!(
            listed = meta.frames.len(),
            recorded = meta.frame_count,
            "project metadata frame_count disagrees with its frame list"
        );
    }

    let (width, height) = (meta.canvas_size.width, meta.canvas_size.height);
    let mut frames = Vec::with_capacity(meta.frames.len());
    for name in &meta.frames {
        match read_frame(&mut archive, name) {
            Ok(frame) if frame.size() == (width, height) => frames.push(frame),
            Ok(frame) => {
                tracing::warn!(
                    %name,
                    got = ?frame.size(),
                    expected = ?(width, height),
                    "skipping frame with mismatched canvas size"
                );
            }
            Err(err) => {
                tracing::warn!(%name, %err, "skipping unreadable frame");
            }
        }
    }

    FrameSequence::from_frames(width, height, meta.fps, frames)
}

fn read_frame(archive: &mut zip::ZipArchive<File>, name: &str) -> FlipbookResult<Bitmap> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| FlipbookError::io(format!("missing archive entry: {e}")))?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| FlipbookError::io(format!("failed to read archive entry: {e}")))?;
    Bitmap::decode_png(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgba8;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("flipbook-project-tests-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn two_frame_seq() -> FrameSequence {
        let mut seq = FrameSequence::new(6, 4, 24).unwrap();
        let mut edited = Bitmap::new(6, 4, Rgba8::WHITE).unwrap();
        edited.set_pixel(1, 1, Rgba8::new(12, 34, 56, 78));
        seq.commit_current(&edited);
        seq.add_frame(&edited).unwrap();
        seq
    }

    #[test]
    fn save_then_load_round_trips_frames_and_settings() {
        let path = temp_path("roundtrip.flip");
        let seq = two_frame_seq();
        save_project(&path, &seq).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.fps(), 24);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.canvas_size(), (6, 4));
        assert_eq!(loaded.frame(0).unwrap(), seq.frame(0).unwrap());
        assert_eq!(loaded.frame(1).unwrap(), seq.frame(1).unwrap());
        assert_eq!(loaded.current_index(), 0);
    }

    #[test]
    fn missing_archive_fails_the_load() {
        let err = load_project(&temp_path("does-not-exist.flip")).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }

    #[test]
    fn archive_without_metadata_fails_the_load() {
        let path = temp_path("no-meta.flip");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("frame_0000.png", options).unwrap();
        writer
            .write_all(&Bitmap::new(2, 2, Rgba8::WHITE).unwrap().encode_png().unwrap())
            .unwrap();
        writer.finish().unwrap();

        let err = load_project(&path).unwrap_err();
        assert!(err.to_string().contains("metadata is missing"));
    }

    #[test]
    fn corrupt_frame_entry_is_skipped_not_fatal() {
        let path = temp_path("bad-frame.flip");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();

        let meta = ProjectMeta {
            fps: 12,
            frame_count: 2,
            frames: vec!["frame_0000.png".into(), "frame_0001.png".into()],
            canvas_size: CanvasSize { width: 3, height: 3 },
        };
        writer.start_file(META_NAME, options).unwrap();
        writer.write_all(&serde_json::to_vec(&meta).unwrap()).unwrap();

        writer.start_file("frame_0000.png", options).unwrap();
        writer
            .write_all(&Bitmap::new(3, 3, Rgba8::BLACK).unwrap().encode_png().unwrap())
            .unwrap();
        // frame_0001.png holds garbage, not a png.
        writer.start_file("frame_0001.png", options).unwrap();
        writer.write_all(b"this is not a png").unwrap();
        writer.finish().unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(
            *loaded.frame(0).unwrap(),
            Bitmap::new(3, 3, Rgba8::BLACK).unwrap()
        );
    }

    #[test]
    fn all_frames_unreadable_still_yields_one_blank_frame() {
        let path = temp_path("all-bad.flip");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();

        let meta = ProjectMeta {
            fps: 12,
            frame_count: 1,
            frames: vec!["frame_0000.png".into()],
            canvas_size: CanvasSize { width: 4, height: 4 },
        };
        writer.start_file(META_NAME, options).unwrap();
        writer.write_all(&serde_json::to_vec(&meta).unwrap()).unwrap();
        writer.finish().unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(
            *loaded.frame(0).unwrap(),
            Bitmap::new(4, 4, Rgba8::WHITE).unwrap()
        );
    }
}
