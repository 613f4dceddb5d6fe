//! 逐帧呈现编排
//!
//! 固定的每帧序列：应用挂起的尺寸调整 → 按需重算变换并上传 →
//! 摄取新帧 → 获取渲染目标 → 清屏绘制视频四边形 → 提交呈现。
//! 可恢复错误（坏帧、瞬态取帧失败、非法尺寸）就地消化并保留
//! 上一帧画面，只有显存耗尽会终止管线。

use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use super::error::DrawError;
use super::gpu::GpuContext;
use super::ingest::FrameIngestor;
use super::surface::SurfaceManager;
use super::transform::{Camera, SceneState};
use crate::media::DecodedFrame;
use crate::{QUAD_INDICES, QUAD_VERTICES, Vertex};

/// 视频呈现管线
pub struct PresentationPipeline {
    /// GPU 设备
    device: wgpu::Device,
    /// 命令队列
    queue: wgpu::Queue,
    /// 表面管理
    surface: SurfaceManager,
    /// 视频纹理对与上传路径
    ingestor: FrameIngestor,
    /// 渲染管线
    pipeline: wgpu::RenderPipeline,
    /// 绑定组（变换 + 亮度 + 色度 + 采样器）
    bind_group: wgpu::BindGroup,
    /// 变换矩阵统一缓冲
    transform_buf: wgpu::Buffer,
    /// 四边形顶点缓冲
    quad_vb: wgpu::Buffer,
    /// 四边形索引缓冲
    idx_buf: wgpu::Buffer,
    /// 固定虚拟相机
    camera: Camera,
    /// 变换缓存与脏标记
    scene: SceneState,
    /// 挂起的尺寸调整（帧边界统一应用，只保留最新值）
    pending_resize: Option<(u32, u32)>,
}

impl PresentationPipeline {
    /// 以已初始化的 GPU 上下文和视频尺寸创建管线
    #[must_use]
    pub fn new(gpu: GpuContext, video_width: u32, video_height: u32) -> Self {
        let GpuContext {
            surface,
            device,
            queue,
            config,
        } = gpu;
        let surface_format = config.format;
        let viewport = (config.width, config.height);
        let surface = SurfaceManager::new(&device, surface, config);
        let ingestor = FrameIngestor::new(&device, video_width, video_height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("video-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("video.wgsl").into()),
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("video-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("video-pl"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("video-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 12,
                            shader_location: 1,
                        },
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let transform_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("video-transform"),
            size: std::mem::size_of::<[f32; 16]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("video-quad-vb"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let idx_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("video-quad-ib"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("video-bg"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: transform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(ingestor.luma_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(ingestor.chroma_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let scene = SceneState::new(video_width, video_height, viewport.0, viewport.1);
        Self {
            device,
            queue,
            surface,
            ingestor,
            pipeline,
            bind_group,
            transform_buf,
            quad_vb,
            idx_buf,
            camera: Camera::default(),
            scene,
            pending_resize: None,
        }
    }

    /// 记录窗口尺寸变化，在下一个帧边界统一应用
    pub const fn notify_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
    }

    /// 设置视频旋转角度（度）
    pub const fn rotate(&mut self, angle_deg: i32) {
        self.scene.set_angle(angle_deg);
    }

    /// 当前旋转角度（度）
    #[must_use]
    pub const fn angle(&self) -> i32 {
        self.scene.angle()
    }

    /// 呈现一帧
    ///
    /// `frame` 为 `None` 时不摄取新内容，按当前状态重绘上一帧
    /// 画面（用于尺寸调整或旋转之后的刷新）。
    ///
    /// # Errors
    ///
    /// - 显存耗尽（不可恢复，调用方应终止该窗口的管线）
    pub fn present_frame(&mut self, frame: Option<&DecodedFrame>) -> Result<(), DrawError> {
        // 帧边界：应用最新的挂起尺寸
        if let Some((width, height)) = self.pending_resize.take() {
            match self.surface.resize(&self.device, width, height) {
                Ok(()) => self.scene.set_viewport(width, height),
                Err(e) => warn!("忽略尺寸调整: {e}"),
            }
        }

        if self.scene.refresh(&self.camera) {
            let matrix = self.scene.transform().to_cols_array();
            self.queue
                .write_buffer(&self.transform_buf, 0, bytemuck::cast_slice(&matrix));
        }

        if let Some(frame) = frame
            && let Err(e) = self.ingestor.ingest(&self.device, &self.queue, frame)
        {
            // 坏帧丢弃，继续绘制上一帧内容
            warn!("{e}");
        }

        let target = match self.surface.acquire(&self.device) {
            Ok(target) => target,
            Err(super::error::AcquireError::Transient(reason)) => {
                warn!("跳过本帧: {reason}");
                return Ok(());
            }
            Err(super::error::AcquireError::OutOfMemory) => {
                return Err(DrawError::OutOfMemory);
            }
        };
        let view = target
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            rpass.set_index_buffer(self.idx_buf.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        target.present();
        Ok(())
    }

    /// 结束该窗口的呈现
    ///
    /// GPU 资源随所有权释放；解码侧持有的纹理不受影响。
    pub fn teardown(self) {
        debug!("呈现管线关闭");
    }
}
