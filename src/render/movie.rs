use crate::render::color_scale::ColorScale;
use crate::render::error::RenderError;
use crate::types::forecast_array::ForecastArray;
use crate::utils::{ensure_dir_exists, get_frames_dir};
use bon::bon;
use image::codecs::gif::GifEncoder;
use image::{Frame, RgbaImage};
use log::{info, warn};
use ndarray::{Array3, ArrayView2, Axis};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::task;

pub const DEFAULT_TOOL: &str = "gifsicle";

/// GIF widths and heights are 16-bit.
const MAX_GIF_SIDE: u32 = u16::MAX as u32;

/// How frames are painted and assembled.
///
/// # Examples
///
/// ```
/// use meteofrance_wcs::{ColorScale, RenderOptions};
///
/// let options = RenderOptions::builder()
///     .color_scale(ColorScale::precipitation())
///     .delay_cs(25)
///     .value_range((0.0, 10.0))
///     .build();
/// assert_eq!(options.tool, "gifsicle");
/// ```
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub color_scale: ColorScale,
    /// Where frames and the movie are written. Defaults to the user cache directory.
    pub output_dir: Option<PathBuf>,
    /// Executable assembling the frames, called with gifsicle's arguments.
    pub tool: String,
    /// Delay between frames, in hundredths of a second.
    pub delay_cs: u16,
    pub optimize: bool,
    /// Values mapped to both ends of the color scale. Defaults to the finite
    /// range of the array.
    pub value_range: Option<(f32, f32)>,
    /// Each grid cell is painted as a square of this many pixels.
    pub pixel_scale: u32,
}

#[bon]
impl RenderOptions {
    #[builder]
    pub fn new(
        #[builder(default)] color_scale: ColorScale,
        #[builder(into)] output_dir: Option<PathBuf>,
        #[builder(into, default = DEFAULT_TOOL.to_string())] tool: String,
        #[builder(default = 50)] delay_cs: u16,
        #[builder(default = true)] optimize: bool,
        value_range: Option<(f32, f32)>,
        #[builder(default = 1)] pixel_scale: u32,
    ) -> Self {
        Self {
            color_scale,
            output_dir,
            tool,
            delay_cs,
            optimize,
            value_range,
            pixel_scale: pixel_scale.max(1),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Result of [`make_movie`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    /// `<root>.gif`
    pub path: PathBuf,
    /// `<root>_000.gif`, `<root>_001.gif`, ... in time order.
    pub frames: Vec<PathBuf>,
}

/// Writes one GIF per time step of `array` and merges them into `<root_name>.gif`.
///
/// Frames are kept on disk whether or not the assembly succeeds.
///
/// # Errors
///
/// [`RenderError::EmptyArray`] when there is nothing to draw,
/// [`RenderError::FrameTooLarge`] when `pixel_scale` makes frames wider or
/// taller than a GIF allows,
/// [`RenderError::ToolSpawn`] / [`RenderError::ToolFailed`] when the assembling
/// tool cannot be run or exits unsuccessfully.
pub async fn make_movie(
    array: &ForecastArray,
    root_name: &str,
    options: &RenderOptions,
) -> Result<Movie, RenderError> {
    if array.is_empty() {
        return Err(RenderError::EmptyArray);
    }
    let (_, height, width) = array.shape();
    let pixel_scale = options.pixel_scale;
    let frame_size = scaled_size(width, height, pixel_scale).ok_or(RenderError::FrameTooLarge {
        width,
        height,
        pixel_scale,
    })?;

    let dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => get_frames_dir().map_err(RenderError::FramesDirResolution)?,
    };
    ensure_dir_exists(&dir)
        .await
        .map_err(|e| RenderError::Io(dir.clone(), e))?;

    let (min, max) = options
        .value_range
        .or_else(|| array.value_range())
        .unwrap_or((0.0, 1.0));

    let values = array.values.clone();
    let scale = options.color_scale.clone();
    let frame_root = dir.join(root_name);
    let frames = task::spawn_blocking(move || {
        write_frames(&values, &frame_root, &scale, (min, max), pixel_scale, frame_size)
    })
    .await??;
    info!("Wrote {} frames to {}", frames.len(), dir.display());

    let path = dir.join(format!("{root_name}.gif"));
    assemble(options, &frames, &path).await?;
    info!("Movie written to {}", path.display());

    Ok(Movie { path, frames })
}

impl ForecastArray {
    /// See [`make_movie`].
    pub async fn make_movie(
        &self,
        root_name: &str,
        options: &RenderOptions,
    ) -> Result<Movie, RenderError> {
        make_movie(self, root_name, options).await
    }
}

fn write_frames(
    values: &Array3<f32>,
    frame_root: &Path,
    scale: &ColorScale,
    range: (f32, f32),
    pixel_scale: u32,
    frame_size: (u32, u32),
) -> Result<Vec<PathBuf>, RenderError> {
    let stem = frame_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    values
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(index, frame)| {
            let path = frame_root.with_file_name(format!("{stem}_{index:03}.gif"));
            write_frame(frame, &path, scale, range, pixel_scale, frame_size)?;
            Ok(path)
        })
        .collect()
}

fn write_frame(
    frame: ArrayView2<'_, f32>,
    path: &Path,
    scale: &ColorScale,
    (min, max): (f32, f32),
    pixel_scale: u32,
    (image_width, image_height): (u32, u32),
) -> Result<(), RenderError> {
    let image = RgbaImage::from_fn(image_width, image_height, |x, y| {
        let value = frame[[(y / pixel_scale) as usize, (x / pixel_scale) as usize]];
        scale.map(value, min, max)
    });

    let file = std::fs::File::create(path).map_err(|e| RenderError::Io(path.to_path_buf(), e))?;
    let mut encoder = GifEncoder::new(file);
    encoder
        .encode_frame(Frame::new(image))
        .map_err(|e| RenderError::FrameWrite(path.to_path_buf(), e))
}

/// Pixel size of a `width` x `height` grid painted at `pixel_scale`, if a GIF
/// can hold it.
fn scaled_size(width: usize, height: usize, pixel_scale: u32) -> Option<(u32, u32)> {
    let side = |cells: usize| {
        u32::try_from(cells)
            .ok()?
            .checked_mul(pixel_scale)
            .filter(|pixels| *pixels <= MAX_GIF_SIDE)
    };
    Some((side(width)?, side(height)?))
}

async fn assemble(options: &RenderOptions, frames: &[PathBuf], output: &Path) -> Result<(), RenderError> {
    let mut command = Command::new(&options.tool);
    command
        .arg("--merge")
        .arg("--delay")
        .arg(options.delay_cs.to_string())
        .arg("--loopcount=forever");
    if options.optimize {
        command.arg("-O3");
    }
    command.args(frames).arg("-o").arg(output);

    let result = command.output().await.map_err(|e| RenderError::ToolSpawn {
        tool: options.tool.clone(),
        source: e,
    })?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        warn!("{} failed with {}: {}", options.tool, result.status, stderr);
        return Err(RenderError::ToolFailed {
            tool: options.tool.clone(),
            status: result.status,
            stderr,
        });
    }
    Ok(())
}
