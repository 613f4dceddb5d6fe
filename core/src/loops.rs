//! 线程间消息与播放循环
//!
//! - `playback`：解码节拍循环（工作线程）
//!
//! 渲染在事件线程上进行，解码循环通过有界通道把帧推给它。

pub mod playback;

use crate::media::DecodedFrame;

/// 控制播放循环的消息
pub enum ControlMsg {
    /// 触发播放循环开始
    Start,
    /// 请求播放循环尽快退出
    Stop,
}

/// 视觉循环消息
pub enum VisualMsg {
    /// 呈现一帧解码内容
    Frame(DecodedFrame),
    /// 设置视频旋转角度（度）
    Rotate(i32),
    /// 帧源耗尽，播放结束
    Eof,
}
