//! # ViStream - winit 平台实现
//!
//! 提供 winit 窗口系统与事件循环的桌面平台实现

#![cfg(not(target_arch = "wasm32"))]

mod app;

use anyhow::Result;
use std::sync::mpsc;

use vistream::config::Window as WindowCfg;
use vistream::loops::{ControlMsg, VisualMsg};

/// 运行 winit 事件循环并驱动视频呈现
///
/// # 参数
///
/// - `visual_rx`: 视觉消息接收端（帧、旋转、结束）
/// - `control_tx`: 播放循环控制消息发送端
/// - `window_cfg`: 窗口初始尺寸与标题
/// - `video_size`: 视频尺寸 (width, height)
///
/// # Errors
///
/// - winit 事件循环创建或运行失败
pub fn run(
    visual_rx: mpsc::Receiver<VisualMsg>,
    control_tx: mpsc::SyncSender<ControlMsg>,
    window_cfg: WindowCfg,
    video_size: (u32, u32),
) -> Result<()> {
    app::run_internal(visual_rx, control_tx, window_cfg, video_size)
}
