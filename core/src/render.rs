//! 视频帧呈现管线
//!
//! - `convert`：平面 4:2:0 → 半平面（NV12）像素转换
//! - `transform`：宽高比适配与相机/旋转变换合成
//! - `ingest`：帧摄取（零拷贝路径与软件上传路径）
//! - `surface`：渲染表面与交换缓冲管理
//! - `pipeline`：逐帧呈现编排
//! - `gpu`：wgpu 设备与表面初始化
//! - `error`：分层错误类型

pub mod convert;
pub mod error;
pub mod gpu;
pub mod ingest;
pub mod pipeline;
pub mod surface;
pub mod transform;

pub use error::{AcquireError, DrawError, IngestError, InitError, ResizeError};
pub use gpu::{GpuContext, init_gpu};
pub use ingest::FrameIngestor;
pub use pipeline::PresentationPipeline;
pub use surface::SurfaceManager;
pub use transform::{Camera, SceneState};
