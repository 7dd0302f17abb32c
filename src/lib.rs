#![forbid(unsafe_code)]

pub mod draw;
pub mod editor;
pub mod error;
pub mod export;
pub mod fill;
pub mod history;
pub mod playback;
pub mod project;
pub mod raster;
pub mod sequence;
pub mod surface;

pub use editor::Editor;
pub use error::{FlipbookError, FlipbookResult};
pub use export::{ExportConfig, default_mp4_config, export_animation, export_in_background};
pub use history::{HISTORY_DEPTH, HistoryStack};
pub use playback::Playback;
pub use project::{CanvasSize, ProjectMeta, load_project, save_project};
pub use raster::{Bitmap, Rgba8};
pub use sequence::{FrameSequence, MAX_FPS, MIN_FPS};
pub use surface::{PixelSurface, Tool};
