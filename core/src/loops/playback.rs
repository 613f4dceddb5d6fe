//! 播放循环：按固定节拍拉帧并推送给视觉循环
//!
//! - 以固定间隔从帧源拉取下一帧
//! - 可选的自动旋转：每 N 帧把旋转角度推进 -90°
//! - 通过有界通道阻塞发送，呈现速度决定解码速度

use std::{
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::loops::{ControlMsg, VisualMsg};
use crate::media::FrameSource;

/// 播放循环参数
pub struct PlaybackParams {
    /// 拉帧间隔
    pub tick: Duration,
    /// 每 N 帧自动旋转 -90°（`None` 关闭）
    pub rotate_every_frames: Option<u64>,
}

/// 运行播放循环
///
/// - `source`：视频帧源
/// - `params`：节拍与自动旋转参数
/// - `control_rx`：启动/停止控制消息接收端
/// - `visual_tx`：视觉消息发送端（有界，满时阻塞等待）
///
/// 收到 `Stop`、帧源耗尽或对端关闭时返回。
pub fn run(
    mut source: Box<dyn FrameSource>,
    params: PlaybackParams,
    control_rx: mpsc::Receiver<ControlMsg>,
    visual_tx: mpsc::SyncSender<VisualMsg>,
) {
    match control_rx.recv() {
        Ok(ControlMsg::Start) => {}
        Ok(ControlMsg::Stop) | Err(_) => return,
    }
    debug!(
        width = source.width(),
        height = source.height(),
        fps = source.fps(),
        "播放循环启动"
    );

    let started = Instant::now();
    let mut frame_count: u64 = 0;
    let mut angle_deg: i32 = 0;
    let mut last_log_sec: u64 = 0;
    let mut frames_this_sec: u32 = 0;
    loop {
        match control_rx.try_recv() {
            Ok(ControlMsg::Stop) => {
                debug!(frame_count, "播放循环收到停止请求");
                return;
            }
            Ok(ControlMsg::Start) | Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => return,
        }
        thread::sleep(params.tick);

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!(frame_count, "帧源耗尽");
                let _ = visual_tx.send(VisualMsg::Eof);
                return;
            }
            Err(e) => {
                // 坏帧跳过，下一拍继续
                warn!("拉帧失败: {e}");
                continue;
            }
        };

        if let Some(n) = params.rotate_every_frames
            && n > 0
        {
            #[allow(clippy::cast_possible_truncation)]
            let target = 90 * -((frame_count / n) as i32);
            if target != angle_deg {
                angle_deg = target;
                if visual_tx.send(VisualMsg::Rotate(angle_deg)).is_err() {
                    return;
                }
            }
        }
        if visual_tx.send(VisualMsg::Frame(frame)).is_err() {
            return;
        }
        frame_count += 1;
        frames_this_sec += 1;

        let sec = started.elapsed().as_secs();
        if sec != last_log_sec {
            debug!(
                elapsed_sec = sec,
                frame_count,
                frames_per_sec = frames_this_sec,
                angle_deg,
                "播放循环性能统计"
            );
            frames_this_sec = 0;
            last_log_sec = sec;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{DecodedFrame, TestPatternSource};
    use anyhow::Result;

    /// 产出固定帧数后结束的帧源
    struct CountingSource {
        inner: TestPatternSource,
        remaining: u64,
    }

    impl FrameSource for CountingSource {
        fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            self.inner.next_frame()
        }

        fn width(&self) -> u32 {
            self.inner.width()
        }

        fn height(&self) -> u32 {
            self.inner.height()
        }

        fn fps(&self) -> f64 {
            self.inner.fps()
        }
    }

    fn spawn_loop(
        total: u64,
        rotate_every_frames: Option<u64>,
    ) -> (
        mpsc::SyncSender<ControlMsg>,
        mpsc::Receiver<VisualMsg>,
        thread::JoinHandle<()>,
    ) {
        let source = Box::new(CountingSource {
            inner: TestPatternSource::new(16, 16, 30.0),
            remaining: total,
        });
        let (control_tx, control_rx) = mpsc::sync_channel(4);
        let (visual_tx, visual_rx) = mpsc::sync_channel(1);
        let handle = thread::spawn(move || {
            run(
                source,
                PlaybackParams {
                    tick: Duration::ZERO,
                    rotate_every_frames,
                },
                control_rx,
                visual_tx,
            );
        });
        (control_tx, visual_rx, handle)
    }

    #[test]
    fn test_playback_delivers_frames_then_eof() {
        let (control_tx, visual_rx, handle) = spawn_loop(5, None);
        control_tx.send(ControlMsg::Start).unwrap();

        let mut frames = 0;
        loop {
            match visual_rx.recv().unwrap() {
                VisualMsg::Frame(_) => frames += 1,
                VisualMsg::Eof => break,
                VisualMsg::Rotate(_) => panic!("未开启自动旋转"),
            }
        }
        assert_eq!(frames, 5);
        handle.join().unwrap();
    }

    #[test]
    fn test_playback_rotation_cadence() {
        // 每 2 帧旋转一次：第 2 帧前推进到 -90°，第 4 帧前推进到 -180°
        let (control_tx, visual_rx, handle) = spawn_loop(5, Some(2));
        control_tx.send(ControlMsg::Start).unwrap();

        let mut angles = Vec::new();
        let mut frames = 0;
        loop {
            match visual_rx.recv().unwrap() {
                VisualMsg::Frame(_) => frames += 1,
                VisualMsg::Rotate(deg) => angles.push((frames, deg)),
                VisualMsg::Eof => break,
            }
        }
        assert_eq!(frames, 5);
        assert_eq!(angles, vec![(2, -90), (4, -180)]);
        handle.join().unwrap();
    }

    #[test]
    fn test_playback_stop_before_start() {
        let (control_tx, visual_rx, handle) = spawn_loop(100, None);
        control_tx.send(ControlMsg::Stop).unwrap();
        handle.join().unwrap();
        // 循环未启动，不应产出任何消息
        assert!(visual_rx.try_recv().is_err());
    }

    #[test]
    fn test_playback_stops_on_request() {
        let (control_tx, visual_rx, handle) = spawn_loop(u64::MAX, None);
        control_tx.send(ControlMsg::Start).unwrap();
        // 消费若干帧后请求停止
        for _ in 0..3 {
            match visual_rx.recv().unwrap() {
                VisualMsg::Frame(_) => {}
                other => panic!("预期帧消息，得到 {}", msg_name(&other)),
            }
        }
        control_tx.send(ControlMsg::Stop).unwrap();
        // 继续排空通道直到循环退出关闭发送端
        while visual_rx.recv().is_ok() {}
        handle.join().unwrap();
    }

    fn msg_name(msg: &VisualMsg) -> &'static str {
        match msg {
            VisualMsg::Frame(_) => "Frame",
            VisualMsg::Rotate(_) => "Rotate",
            VisualMsg::Eof => "Eof",
        }
    }
}
