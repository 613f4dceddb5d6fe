//! winit 窗口与事件循环入口
//!
//! 呈现在事件线程上进行：每次重绘先排空视觉通道中的旋转消息，
//! 取出至多一帧内容，再执行一次完整的呈现序列。

#![cfg(not(target_arch = "wasm32"))]
use std::sync::mpsc;

use anyhow::Result;
use tracing::{error, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowId,
};

use vistream::config::Window as WindowCfg;
use vistream::loops::{ControlMsg, VisualMsg};
use vistream::render::{PresentationPipeline, init_gpu};

/// 视觉应用状态
struct App {
    /// 窗口实例
    window: winit::window::Window,
    /// 呈现管线
    pipeline: PresentationPipeline,
}

/// 视觉事件处理器
struct Handler {
    /// 可选的视觉应用状态
    app: Option<App>,
    /// 视觉消息接收端
    visual_rx: mpsc::Receiver<VisualMsg>,
    /// 控制消息发送端
    control_tx: mpsc::SyncSender<ControlMsg>,
    /// 窗口初始配置
    window_cfg: WindowCfg,
    /// 视频尺寸 (width, height)
    video_size: (u32, u32),
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        let attrs = winit::window::Window::default_attributes()
            .with_title(self.window_cfg.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(self.window_cfg.width),
                f64::from(self.window_cfg.height),
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => w,
            Err(e) => {
                error!("创建窗口失败: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let gpu = match init_gpu(&window, (size.width.max(1), size.height.max(1))) {
            Ok(gpu) => gpu,
            Err(e) => {
                error!("{e}");
                event_loop.exit();
                return;
            }
        };
        let pipeline = PresentationPipeline::new(gpu, self.video_size.0, self.video_size.1);
        self.app = Some(App { window, pipeline });
        let _ = self.control_tx.try_send(ControlMsg::Start);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                if let Some(app) = self.app.as_mut() {
                    app.pipeline.notify_resize(size.width, size.height);
                    app.window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                // R 键手动旋转 90°
                if event.physical_key == PhysicalKey::Code(KeyCode::KeyR)
                    && event.state == ElementState::Pressed
                    && !event.repeat
                    && let Some(app) = self.app.as_mut()
                {
                    let angle = app.pipeline.angle() + 90;
                    app.pipeline.rotate(angle);
                    app.window.request_redraw();
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let Some(app) = self.app.as_mut() else {
                    return;
                };
                let mut frame = None;
                let mut eof = false;
                loop {
                    match self.visual_rx.try_recv() {
                        Ok(VisualMsg::Rotate(deg)) => app.pipeline.rotate(deg),
                        Ok(VisualMsg::Frame(f)) => {
                            frame = Some(f);
                            break;
                        }
                        Ok(VisualMsg::Eof) => {
                            eof = true;
                            break;
                        }
                        Err(mpsc::TryRecvError::Empty) => break,
                        Err(mpsc::TryRecvError::Disconnected) => {
                            eof = true;
                            break;
                        }
                    }
                }
                if let Err(e) = app.pipeline.present_frame(frame.as_ref()) {
                    error!("{e}");
                    event_loop.exit();
                    return;
                }
                if eof {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = self.app.as_ref() {
            app.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.control_tx.try_send(ControlMsg::Stop).is_err() {
            warn!("播放循环已退出，停止请求未送达");
        }
        if let Some(app) = self.app.take() {
            app.pipeline.teardown();
        }
    }
}

/// 运行 winit 事件循环并驱动视频呈现（内部实现）
pub fn run_internal(
    visual_rx: mpsc::Receiver<VisualMsg>,
    control_tx: mpsc::SyncSender<ControlMsg>,
    window_cfg: WindowCfg,
    video_size: (u32, u32),
) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut handler = Handler {
        app: None,
        visual_rx,
        control_tx,
        window_cfg,
        video_size,
    };
    event_loop.run_app(&mut handler)?;
    Ok(())
}
