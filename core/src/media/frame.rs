//! 解码帧类型定义
//!
//! 以显式的和类型区分两条摄取路径，摄取端据此做穷尽匹配，
//! 不依赖外部布尔标志判断帧的驻留位置。

use std::sync::Arc;

/// 像素格式标签
///
/// 管线的软件路径仅支持平面 4:2:0；其余标签用于表达
/// 解码器可能产出、但会被丢弃的格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 平面 4:2:0（Y/U/V 三个独立平面）
    Yuv420p,
    /// 平面 4:2:2
    Yuv422p,
    /// 交错 RGBA8
    Rgba8,
}

/// CPU 驻留帧：三个独立平面及其行跨度
///
/// 平面数据在一次摄取调用期间有效；摄取端完成转换上传后即可释放。
#[derive(Debug, Clone)]
pub struct CpuFrame {
    /// Y / U / V 平面数据
    pub planes: [Vec<u8>; 3],
    /// 各平面的行跨度（字节）
    pub strides: [usize; 3],
    /// 像素格式标签
    pub format: PixelFormat,
    /// 宽度（像素）
    pub width: u32,
    /// 高度（像素）
    pub height: u32,
}

/// GPU 驻留帧：解码器持有的纹理阵列中的一层
///
/// 亮度与色度平面分别位于两个纹理阵列的同一层；
/// 句柄仅在解码器回收该层之前有效，摄取端必须在
/// 返回控制权之前完成区域拷贝。
#[derive(Debug, Clone)]
pub struct GpuFrame {
    /// 亮度平面纹理阵列（R8Unorm，满分辨率）
    pub luma: Arc<wgpu::Texture>,
    /// 色度平面纹理阵列（Rg8Unorm，半分辨率）
    pub chroma: Arc<wgpu::Texture>,
    /// 本帧所在的阵列层索引
    pub layer: u32,
    /// 宽度（像素）
    pub width: u32,
    /// 高度（像素）
    pub height: u32,
}

/// 解码后的视频帧
#[derive(Debug, Clone)]
pub enum DecodedFrame {
    /// 零拷贝（硬件）路径：数据保留在 GPU 上
    Gpu(GpuFrame),
    /// 软件路径：CPU 内存中的平面数据
    Cpu(CpuFrame),
}

impl DecodedFrame {
    /// 帧的像素尺寸（宽, 高）
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Gpu(f) => (f.width, f.height),
            Self::Cpu(f) => (f.width, f.height),
        }
    }
}
