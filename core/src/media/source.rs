//! 帧源抽象与合成测试图样源
//!
//! 帧源是拉取式接口：每次调用产出一帧或"本次无数据"。

use anyhow::Result;

use super::{CpuFrame, DecodedFrame, PixelFormat};

/// 视频帧源 trait
///
/// 解码器实现此 trait 向呈现管线供帧。
pub trait FrameSource: Send {
    /// 拉取下一帧
    ///
    /// 返回 `Some(DecodedFrame)` 表示成功取得一帧；
    /// 返回 `None` 表示流已结束。
    ///
    /// # Errors
    ///
    /// 解码失败时返回错误。
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>>;

    /// 视频宽度（像素）
    fn width(&self) -> u32;

    /// 视频高度（像素）
    fn height(&self) -> u32;

    /// 帧率（FPS）
    fn fps(&self) -> f64;
}

/// 合成测试图样源
///
/// 产出无限的平面 4:2:0 动态渐变图样，无需任何外部解码库，
/// 用于演示与测试。
pub struct TestPatternSource {
    width: u32,
    height: u32,
    fps: f64,
    frame_index: u64,
}

impl TestPatternSource {
    /// 创建指定尺寸的测试图样源
    #[must_use]
    pub const fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            frame_index: 0,
        }
    }

    /// 生成一帧平面 4:2:0 图样
    fn make_frame(&self) -> CpuFrame {
        let w = self.width as usize;
        let h = self.height as usize;
        let cw = (w + 1) >> 1;
        let ch = (h + 1) >> 1;
        let t = self.frame_index as usize;

        // 亮度：随时间平移的对角渐变
        let mut y_plane = vec![0u8; w * h];
        for row in 0..h {
            for col in 0..w {
                y_plane[row * w + col] = ((col + row + t * 2) & 0xFF) as u8;
            }
        }
        // 色度：缓慢旋转的色相条纹
        let mut u_plane = vec![0u8; cw * ch];
        let mut v_plane = vec![0u8; cw * ch];
        for row in 0..ch {
            for col in 0..cw {
                u_plane[row * cw + col] = (128 + (((col * 4 + t) & 0xFF) as i32 - 128) / 2) as u8;
                v_plane[row * cw + col] = (128 + (((row * 4 + t) & 0xFF) as i32 - 128) / 2) as u8;
            }
        }

        CpuFrame {
            planes: [y_plane, u_plane, v_plane],
            strides: [w, cw, cw],
            format: PixelFormat::Yuv420p,
            width: self.width,
            height: self.height,
        }
    }
}

impl FrameSource for TestPatternSource {
    fn next_frame(&mut self) -> Result<Option<DecodedFrame>> {
        let frame = self.make_frame();
        self.frame_index += 1;
        Ok(Some(DecodedFrame::Cpu(frame)))
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
