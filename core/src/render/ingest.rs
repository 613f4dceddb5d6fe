//! 帧摄取：把解码帧送入视频纹理对
//!
//! 归一化目标为半平面布局的两张纹理：满分辨率单通道亮度
//! （`R8Unorm`）加半分辨率双通道交错色度（`Rg8Unorm`）。
//! 零拷贝路径走纹理间复制，软件路径走转换缓冲 + 整帧上传。

use tracing::debug;

use super::convert::{chroma_dim, nv12_buffer_len, yuv420p_to_nv12};
use super::error::IngestError;
use crate::media::{CpuFrame, DecodedFrame, GpuFrame, PixelFormat};

/// 视频纹理对与软件路径的转换缓冲
pub struct FrameIngestor {
    /// 亮度纹理（满分辨率，单通道）
    luma: wgpu::Texture,
    /// 色度纹理（半分辨率，UV 交错双通道）
    chroma: wgpu::Texture,
    /// 亮度纹理视图
    luma_view: wgpu::TextureView,
    /// 色度纹理视图
    chroma_view: wgpu::TextureView,
    /// 视频宽度
    width: u32,
    /// 视频高度
    height: u32,
    /// 软件路径转换缓冲，仅在所需长度变化时重新分配
    scratch: Vec<u8>,
}

impl FrameIngestor {
    /// 按视频尺寸创建纹理对
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let luma = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("video-luma"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let chroma = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("video-chroma"),
            size: wgpu::Extent3d {
                width: chroma_dim(width),
                height: chroma_dim(height),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rg8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let luma_view = luma.create_view(&wgpu::TextureViewDescriptor::default());
        let chroma_view = chroma.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            luma,
            chroma,
            luma_view,
            chroma_view,
            width,
            height,
            scratch: Vec::new(),
        }
    }

    /// 亮度纹理视图（供绑定组使用）
    #[must_use]
    pub const fn luma_view(&self) -> &wgpu::TextureView {
        &self.luma_view
    }

    /// 色度纹理视图（供绑定组使用）
    #[must_use]
    pub const fn chroma_view(&self) -> &wgpu::TextureView {
        &self.chroma_view
    }

    /// 将一帧送入视频纹理对
    ///
    /// # Errors
    ///
    /// - 像素格式不受软件路径支持
    /// - 帧尺寸或平面数据与纹理不匹配
    pub fn ingest(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &DecodedFrame,
    ) -> Result<(), IngestError> {
        match frame {
            DecodedFrame::Gpu(gpu) => self.ingest_gpu(device, queue, gpu),
            DecodedFrame::Cpu(cpu) => self.ingest_cpu(queue, cpu),
        }
    }

    /// 零拷贝路径：从解码器纹理数组切片复制到归一化纹理对
    fn ingest_gpu(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &GpuFrame,
    ) -> Result<(), IngestError> {
        if frame.width != self.width || frame.height != self.height {
            return Err(IngestError::UploadFailed {
                reason: format!(
                    "帧尺寸 {}x{} 与视频纹理 {}x{} 不符",
                    frame.width, frame.height, self.width, self.height
                ),
            });
        }
        if frame.layer >= frame.luma.depth_or_array_layers() {
            return Err(IngestError::UploadFailed {
                reason: format!(
                    "数组层 {} 超出解码器纹理层数 {}",
                    frame.layer,
                    frame.luma.depth_or_array_layers()
                ),
            });
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-ingest"),
        });
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &frame.luma,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: frame.layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: &self.luma,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &frame.chroma,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: frame.layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: &self.chroma,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: chroma_dim(self.width),
                height: chroma_dim(self.height),
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));
        Ok(())
    }

    /// 软件路径：平面帧转半平面布局后整帧上传
    fn ingest_cpu(&mut self, queue: &wgpu::Queue, frame: &CpuFrame) -> Result<(), IngestError> {
        validate_cpu_frame(frame, self.width, self.height)?;

        // 行距同时容纳亮度行与交错色度行（奇数宽度时后者更宽）
        let pitch = frame.strides[0].max(2 * chroma_dim(self.width) as usize);
        let needed = nv12_buffer_len(pitch, self.height);
        if self.scratch.len() != needed {
            debug!(bytes = needed, "重新分配转换缓冲");
            self.scratch = vec![0u8; needed];
        }
        yuv420p_to_nv12(
            &mut self.scratch,
            self.width,
            self.height,
            pitch,
            [&frame.planes[0], &frame.planes[1], &frame.planes[2]],
            frame.strides,
        );

        let pitch_u32 = u32::try_from(pitch).map_err(|_| IngestError::UploadFailed {
            reason: format!("行距 {pitch} 超出范围"),
        })?;
        let luma_len = self.height as usize * pitch;
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.luma,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.scratch[..luma_len],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pitch_u32),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.chroma,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.scratch[luma_len..],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pitch_u32),
                rows_per_image: Some(chroma_dim(self.height)),
            },
            wgpu::Extent3d {
                width: chroma_dim(self.width),
                height: chroma_dim(self.height),
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }
}

/// 校验软件帧是否可被摄取
///
/// # Errors
///
/// - 非平面 4:2:0 格式
/// - 帧尺寸与视频纹理不符
/// - 任一平面数据不足其跨度 × 行数
pub fn validate_cpu_frame(frame: &CpuFrame, width: u32, height: u32) -> Result<(), IngestError> {
    if frame.format != PixelFormat::Yuv420p {
        return Err(IngestError::UnsupportedFormat {
            format: frame.format,
        });
    }
    if frame.width != width || frame.height != height {
        return Err(IngestError::UploadFailed {
            reason: format!(
                "帧尺寸 {}x{} 与视频纹理 {width}x{height} 不符",
                frame.width, frame.height
            ),
        });
    }
    let rows = [
        height as usize,
        chroma_dim(height) as usize,
        chroma_dim(height) as usize,
    ];
    let min_cols = [
        width as usize,
        chroma_dim(width) as usize,
        chroma_dim(width) as usize,
    ];
    for i in 0..3 {
        if frame.strides[i] < min_cols[i] {
            return Err(IngestError::UploadFailed {
                reason: format!("平面 {i} 跨度 {} 小于行宽 {}", frame.strides[i], min_cols[i]),
            });
        }
        // 最后一行允许不含行尾填充
        let needed = frame.strides[i] * (rows[i] - 1) + min_cols[i];
        if frame.planes[i].len() < needed {
            return Err(IngestError::UploadFailed {
                reason: format!(
                    "平面 {i} 数据不足：{} < {needed}",
                    frame.planes[i].len()
                ),
            });
        }
    }
    Ok(())
}
