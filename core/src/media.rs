//! 解码协作方接口
//!
//! 呈现管线不负责解复用与解码，本模块定义两者之间的交接面：
//! - `frame`：解码后的帧类型（GPU 驻留 / CPU 驻留）
//! - `source`：拉取式帧源 trait 与合成测试图样源
//! - `ffmpeg`：基于 FFmpeg 的文件帧源（`ffmpeg` feature）

mod frame;
mod source;

#[cfg(feature = "ffmpeg")]
mod ffmpeg;

pub use frame::{CpuFrame, DecodedFrame, GpuFrame, PixelFormat};
pub use source::{FrameSource, TestPatternSource};

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegSource;
