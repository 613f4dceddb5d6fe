//! 呈现管线错误类型
//!
//! 各组件操作返回显式 `Result`；只有管线编排层决定致命与可恢复。

use thiserror::Error;

use crate::media::PixelFormat;

/// 设备/表面初始化错误（不可恢复，向上传播并终止该窗口）
#[derive(Debug, Error)]
pub enum InitError {
    /// 创建渲染表面失败
    #[error("创建渲染表面失败: {0}")]
    Surface(String),
    /// 请求图形适配器失败
    #[error("请求图形适配器失败: {0}")]
    Adapter(String),
    /// 创建图形设备失败
    #[error("创建图形设备失败: {0}")]
    Device(String),
}

/// 渲染目标调整错误（可恢复：记录日志并保留原目标）
#[derive(Debug, Error)]
pub enum ResizeError {
    /// 目标尺寸含零维度（窗口最小化等）
    #[error("无效的目标尺寸 {width}x{height}")]
    InvalidSize {
        /// 请求的宽度
        width: u32,
        /// 请求的高度
        height: u32,
    },
}

/// 帧摄取错误（可恢复：丢弃该帧，保留上一帧画面）
#[derive(Debug, Error)]
pub enum IngestError {
    /// 软件路径仅支持平面 4:2:0
    #[error("不支持的像素格式 {format:?}，丢弃该帧")]
    UnsupportedFormat {
        /// 实际收到的格式标签
        format: PixelFormat,
    },
    /// 帧数据与视频纹理不匹配，上传被拒绝
    #[error("上传失败: {reason}")]
    UploadFailed {
        /// 拒绝原因
        reason: String,
    },
}

/// 获取渲染目标错误
#[derive(Debug, Error)]
pub enum AcquireError {
    /// 瞬态失败（超时、表面过期），下一帧重试
    #[error("获取渲染目标暂时失败: {0}")]
    Transient(String),
    /// 显存耗尽，该窗口的管线无法继续
    #[error("显存不足")]
    OutOfMemory,
}

/// 绘制/呈现错误（致命：终止该窗口的管线，不影响进程）
#[derive(Debug, Error)]
pub enum DrawError {
    /// 显存耗尽
    #[error("显存不足，呈现管线终止")]
    OutOfMemory,
}
