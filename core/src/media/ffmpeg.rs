//! `FFmpeg` 文件帧源实现（桌面端）
//!
//! 解码任意容器中的视频流并统一输出平面 4:2:0 帧。

use anyhow::{Context, Result};
use ffmpeg_next as ffmpeg;
use std::path::Path;

use super::{CpuFrame, DecodedFrame, FrameSource, PixelFormat};

/// `FFmpeg` 视频帧源
pub struct FfmpegSource {
    decoder: ffmpeg::decoder::Video,
    scaler: Option<ffmpeg::software::scaling::Context>,
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    width: u32,
    height: u32,
    fps: f64,
}

impl FfmpegSource {
    /// 打开视频文件并创建帧源
    ///
    /// # Errors
    ///
    /// - 文件打开失败或不含视频流
    /// - 解码器创建失败
    pub fn new(path: &Path) -> Result<Self> {
        ffmpeg::init()?;

        let input = ffmpeg::format::input(&path)
            .with_context(|| format!("无法打开视频文件: {}", path.display()))?;

        let video_stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow::anyhow!("未找到视频流"))?;
        let stream_index = video_stream.index();

        let context_decoder =
            ffmpeg::codec::context::Context::from_parameters(video_stream.parameters())
                .with_context(|| "无法创建解码器上下文")?;
        let decoder = context_decoder
            .decoder()
            .video()
            .with_context(|| "无法创建视频解码器")?;

        let width = decoder.width();
        let height = decoder.height();
        let fps = video_stream.avg_frame_rate().numerator() as f64
            / video_stream.avg_frame_rate().denominator() as f64;

        // 解码输出已是 YUV420P 时不经过缩放器
        let scaler = if decoder.format() == ffmpeg::format::Pixel::YUV420P {
            None
        } else {
            Some(
                ffmpeg::software::scaling::Context::get(
                    decoder.format(),
                    width,
                    height,
                    ffmpeg::format::Pixel::YUV420P,
                    width,
                    height,
                    ffmpeg::software::scaling::Flags::BILINEAR,
                )
                .with_context(|| "无法创建像素格式转换器")?,
            )
        };

        Ok(Self {
            decoder,
            scaler,
            input,
            stream_index,
            width,
            height,
            fps,
        })
    }

    /// 将解码帧的三个平面复制为 `CpuFrame`
    fn copy_planes(frame: &ffmpeg::frame::Video) -> CpuFrame {
        let mut planes: [Vec<u8>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut strides = [0usize; 3];
        for (i, (plane, stride)) in planes.iter_mut().zip(strides.iter_mut()).enumerate() {
            *stride = frame.stride(i);
            *plane = frame.data(i).to_vec();
        }
        CpuFrame {
            planes,
            strides,
            format: PixelFormat::Yuv420p,
            width: frame.width(),
            height: frame.height(),
        }
    }
}

impl FrameSource for FfmpegSource {
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
        loop {
            let mut frame = ffmpeg::frame::Video::empty();
            match self.decoder.receive_frame(&mut frame) {
                Ok(()) => {
                    let cpu = if let Some(scaler) = self.scaler.as_mut() {
                        let mut converted = ffmpeg::frame::Video::empty();
                        scaler.run(&frame, &mut converted)?;
                        Self::copy_planes(&converted)
                    } else {
                        Self::copy_planes(&frame)
                    };
                    return Ok(Some(DecodedFrame::Cpu(cpu)));
                }
                Err(ffmpeg::Error::Eof) => {
                    return Ok(None);
                }
                Err(ffmpeg::Error::Other { errno: _ }) => {
                    // 解码器需要更多数据包
                    let mut sent = false;
                    for (stream, pkt) in self.input.packets() {
                        if stream.index() == self.stream_index {
                            self.decoder.send_packet(&pkt)?;
                            sent = true;
                            break;
                        }
                    }
                    if !sent {
                        // 文件结束，发送空包刷新解码器
                        self.decoder.send_eof()?;
                    }
                }
                Err(e) => {
                    return Err(e.into());
                }
            }
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fps(&self) -> f64 {
        self.fps
    }
}
