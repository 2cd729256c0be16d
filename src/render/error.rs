use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to render: the forecast array has no time steps")]
    EmptyArray,

    #[error("Frames of {width}x{height} cells scaled by {pixel_scale} exceed the GIF size limit")]
    FrameTooLarge {
        width: usize,
        height: usize,
        pixel_scale: u32,
    },

    #[error("Failed to determine the frames directory")]
    FramesDirResolution(#[source] std::io::Error),

    #[error("Failed to write frame '{0}'")]
    FrameWrite(PathBuf, #[source] image::ImageError),

    #[error("I/O error on '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to launch '{tool}'")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{tool}' exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
