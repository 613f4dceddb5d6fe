//! 渲染表面与交换缓冲管理
//!
//! 封装表面重配置与取帧重试：尺寸调整幂等，丢失/过期的表面
//! 重配置后重试一次，超时类失败交由调用方下一帧再试。

use tracing::warn;

use super::error::{AcquireError, ResizeError};

/// 渲染表面管理器
pub struct SurfaceManager {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl SurfaceManager {
    /// 以初始配置接管表面并完成首次配置
    pub fn new(
        device: &wgpu::Device,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    ) -> Self {
        surface.configure(device, &config);
        Self { surface, config }
    }

    /// 当前表面尺寸 (width, height)
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// 表面像素格式
    #[must_use]
    pub const fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// 调整渲染目标尺寸
    ///
    /// 与当前尺寸一致时为无操作；任一维度为零（窗口最小化等）
    /// 时拒绝并保留原目标。
    ///
    /// # Errors
    ///
    /// - 目标尺寸含零维度
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<(), ResizeError> {
        if apply_resize(&mut self.config, width, height)? {
            self.surface.configure(device, &self.config);
        }
        Ok(())
    }

    /// 获取下一个渲染目标
    ///
    /// 表面丢失或过期时按当前配置重建并重试一次。
    ///
    /// # Errors
    ///
    /// - `Transient`：超时或重试仍失败，下一帧再试
    /// - `OutOfMemory`:显存耗尽，不可恢复
    pub fn acquire(&mut self, device: &wgpu::Device) -> Result<wgpu::SurfaceTexture, AcquireError> {
        match self.surface.get_current_texture() {
            Ok(target) => Ok(target),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("渲染表面失效，按当前配置重建");
                self.surface.configure(device, &self.config);
                match self.surface.get_current_texture() {
                    Ok(target) => Ok(target),
                    Err(wgpu::SurfaceError::OutOfMemory) => Err(AcquireError::OutOfMemory),
                    Err(e) => Err(AcquireError::Transient(e.to_string())),
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(AcquireError::OutOfMemory),
            Err(e) => Err(AcquireError::Transient(e.to_string())),
        }
    }
}

/// 将目标尺寸写入表面配置
///
/// 返回配置是否发生变化（变化时调用方需重新配置表面）。
///
/// # Errors
///
/// - 目标尺寸含零维度
fn apply_resize(
    config: &mut wgpu::SurfaceConfiguration,
    width: u32,
    height: u32,
) -> Result<bool, ResizeError> {
    if width == 0 || height == 0 {
        return Err(ResizeError::InvalidSize { width, height });
    }
    if config.width == width && config.height == height {
        return Ok(false);
    }
    config.width = width;
    config.height = height;
    Ok(true)
}
