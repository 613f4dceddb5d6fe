//! ViStream 核心库：视频帧呈现管线
//!
//! - `media`：解码协作方接口（帧类型与帧源）
//! - `render`：像素转换、变换合成与 GPU 呈现管线
//! - `loops`：解码工作线程与跨线程消息
//! - `config` / `logging`：系统配置与日志初始化

pub mod config;
pub mod logging;
pub mod loops;
pub mod media;
pub mod render;

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Zeroable, Pod)]
/// 带纹理坐标的四边形顶点
pub struct Vertex {
    /// 位置（x, y, z）
    pub pos: [f32; 3],
    /// 纹理坐标（u, v）
    pub uv: [f32; 2],
}

/// 覆盖 [-1, 1]² 的视频四边形顶点（左上起顺时针）
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex {
        pos: [-1.0, 1.0, 0.0],
        uv: [0.0, 0.0],
    },
    Vertex {
        pos: [1.0, 1.0, 0.0],
        uv: [1.0, 0.0],
    },
    Vertex {
        pos: [1.0, -1.0, 0.0],
        uv: [1.0, 1.0],
    },
    Vertex {
        pos: [-1.0, -1.0, 0.0],
        uv: [0.0, 1.0],
    },
];

/// 视频四边形的三角形索引
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
