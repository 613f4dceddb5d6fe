//! 变换合成：宽高比适配、离散旋转与固定虚拟相机
//!
//! 合成顺序为 物体空间缩放 → 绕视轴旋转 → 相机视图投影，
//! 即列向量约定下的 `view_proj × rot_z × scale`。

use glam::{Mat4, Vec3, Vec4};

/// 固定虚拟相机
///
/// 构造一次后只读：位于视频四边形前方，朝 +Z 观察，
/// 用窄视野透视投影呈现一个贴向相机的平面。
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// 相机位置
    pub position: Vec3,
    /// 近平面处投影窗口宽度
    pub view_width: f32,
    /// 近平面处投影窗口高度
    pub view_height: f32,
    /// 近平面距离
    pub near: f32,
    /// 远平面距离
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -2.0),
            view_width: 0.5,
            view_height: 0.5,
            near: 0.5,
            far: 40.0,
        }
    }
}

impl Camera {
    /// 视图 × 投影矩阵（左手系，列向量约定）
    #[must_use]
    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_lh(self.position, self.position + Vec3::Z, Vec3::Y);
        let proj = perspective_lh_extents(self.view_width, self.view_height, self.near, self.far);
        proj * view
    }
}

/// 由近平面窗口尺寸构造左手系透视投影（深度范围 [0, 1]）
fn perspective_lh_extents(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
    let range = far / (far - near);
    Mat4::from_cols(
        Vec4::new(2.0 * near / width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near / height, 0.0, 0.0),
        Vec4::new(0.0, 0.0, range, 1.0),
        Vec4::new(0.0, 0.0, -near * range, 0.0),
    )
}

/// 信箱适配缩放（只缩不裁、不非均匀拉伸）
///
/// 旋转 90°/270° 时视频的视觉占位旋转了 90°，因此与交换后的
/// 视口宽高比比较；非 90° 整数倍的角度按直立类处理（不支持的
/// 输入，宽高比语义未定义）。
#[must_use]
pub fn fit_scale(
    video_w: u32,
    video_h: u32,
    viewport_w: u32,
    viewport_h: u32,
    angle_deg: i32,
) -> (f32, f32) {
    let vw = video_w as f64;
    let vh = video_h as f64;
    let pw = viewport_w as f64;
    let ph = viewport_h as f64;

    let src_ratio = vw / vh;
    let dst_ratio = if angle_deg.rem_euclid(180) == 0 {
        pw / ph
    } else if angle_deg.rem_euclid(90) == 0 {
        ph / pw
    } else {
        pw / ph
    };

    if src_ratio > dst_ratio {
        // 视频相对更宽：压缩纵向
        (1.0, (dst_ratio / src_ratio) as f32)
    } else if src_ratio < dst_ratio {
        // 视频相对更高：压缩横向
        ((src_ratio / dst_ratio) as f32, 1.0)
    } else {
        (1.0, 1.0)
    }
}

/// 合成最终变换
///
/// glam 与 WGSL 均为列主序、列向量约定，上传前无需转置；
/// 着色器中以 `matrix * vec4(pos, 1.0)` 应用。
#[must_use]
pub fn compose(
    camera: &Camera,
    video_w: u32,
    video_h: u32,
    viewport_w: u32,
    viewport_h: u32,
    angle_deg: i32,
) -> Mat4 {
    let (sx, sy) = fit_scale(video_w, video_h, viewport_w, viewport_h, angle_deg);
    let rotation = Mat4::from_rotation_z((angle_deg as f32).to_radians());
    let scale = Mat4::from_scale(Vec3::new(sx, sy, 1.0));
    camera.view_proj() * rotation * scale
}

/// 变换缓存与脏标记
///
/// 视口尺寸或旋转角度变化时置脏，下一帧开始时重算一次并清除；
/// 绘制第 N 帧所用矩阵总与第 N 帧开始时的视口与角度一致。
#[derive(Debug)]
pub struct SceneState {
    video_w: u32,
    video_h: u32,
    viewport_w: u32,
    viewport_h: u32,
    angle_deg: i32,
    needs_recompute: bool,
    transform: Mat4,
}

impl SceneState {
    /// 以视频尺寸与初始视口创建；首帧前必然重算一次
    #[must_use]
    pub const fn new(video_w: u32, video_h: u32, viewport_w: u32, viewport_h: u32) -> Self {
        Self {
            video_w,
            video_h,
            viewport_w,
            viewport_h,
            angle_deg: 0,
            needs_recompute: true,
            transform: Mat4::IDENTITY,
        }
    }

    /// 视口尺寸变化，置脏
    pub const fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_w = width;
        self.viewport_h = height;
        self.needs_recompute = true;
    }

    /// 设置旋转角度（度，90 的整数倍有意义），置脏
    pub const fn set_angle(&mut self, angle_deg: i32) {
        self.angle_deg = angle_deg;
        self.needs_recompute = true;
    }

    /// 当前旋转角度（度）
    #[must_use]
    pub const fn angle(&self) -> i32 {
        self.angle_deg
    }

    /// 若处于脏状态则重算变换并清除标记；返回是否发生了重算
    pub fn refresh(&mut self, camera: &Camera) -> bool {
        if !self.needs_recompute {
            return false;
        }
        self.transform = compose(
            camera,
            self.video_w,
            self.video_h,
            self.viewport_w,
            self.viewport_h,
            self.angle_deg,
        );
        self.needs_recompute = false;
        true
    }

    /// 当前缓存的变换矩阵
    #[must_use]
    pub const fn transform(&self) -> Mat4 {
        self.transform
    }

    /// 是否等待重算
    #[must_use]
    pub const fn needs_recompute(&self) -> bool {
        self.needs_recompute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_scale_equal_aspect_is_unit() {
        let (sx, sy) = fit_scale(16, 9, 16, 9, 0);
        assert_relative_eq!(sx, 1.0);
        assert_relative_eq!(sy, 1.0);
    }

    #[test]
    fn test_fit_scale_rotated_matches_swapped_aspect() {
        // 旋转 90° 后与交换的视口宽高比一致，应得单位缩放
        let (sx, sy) = fit_scale(16, 9, 9, 16, 90);
        assert_relative_eq!(sx, 1.0);
        assert_relative_eq!(sy, 1.0);
    }

    #[test]
    fn test_fit_scale_narrow_video_shrinks_horizontal() {
        // 4:3 放入 16:9：源比例小于目标，横向压缩为 0.75
        let (sx, sy) = fit_scale(4, 3, 16, 9, 0);
        assert_relative_eq!(sx, 0.75, epsilon = 1e-6);
        assert_relative_eq!(sy, 1.0);
    }

    #[test]
    fn test_fit_scale_wide_video_shrinks_vertical() {
        // 16:9 放入 4:3：源比例大于目标，纵向压缩为 0.75
        let (sx, sy) = fit_scale(16, 9, 4, 3, 0);
        assert_relative_eq!(sx, 1.0);
        assert_relative_eq!(sy, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_fit_scale_negative_angle_uses_rotated_class() {
        // 自动旋转产生负角度；-90° 与 90° 同类
        let (sx, sy) = fit_scale(16, 9, 9, 16, -90);
        assert_relative_eq!(sx, 1.0);
        assert_relative_eq!(sy, 1.0);
    }

    #[test]
    fn test_compose_convention_end_to_end() {
        // 相机位于 (0,0,-2)、近平面窗口 0.5×0.5 时，z=0 平面上的点
        // 经视图投影后 NDC 的 x、y 与视空间相同。据此端到端验证
        // 列向量约定：四边形角点 (1,1) 在单位缩放下映射到 NDC (1,1)。
        let camera = Camera::default();
        let m = compose(&camera, 16, 9, 16, 9, 0);
        let corner = m.project_point3(Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-5);

        // 旋转 90° 后该角点落到 (-1, 1)
        let m = compose(&camera, 16, 9, 9, 16, 90);
        let corner = m.project_point3(Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(corner.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_scene_state_dirty_flag_cycle() {
        let camera = Camera::default();
        let mut scene = SceneState::new(1280, 720, 640, 480);
        assert!(scene.needs_recompute());
        assert!(scene.refresh(&camera));
        assert!(!scene.needs_recompute());
        // 无变化时不重算
        assert!(!scene.refresh(&camera));

        scene.set_angle(90);
        assert!(scene.needs_recompute());
        assert!(scene.refresh(&camera));
    }

    #[test]
    fn test_scene_rotate_then_resize_matches_rotated_fit() {
        // 端到端场景：640×480 视口、1280×720 视频，旋转 90° 后把
        // 视口调整为 480×640，再呈现——最终变换应与旋转类适配一致。
        let camera = Camera::default();
        let mut scene = SceneState::new(1280, 720, 640, 480);
        assert!(scene.refresh(&camera));

        scene.set_angle(90);
        scene.set_viewport(480, 640);
        assert!(scene.refresh(&camera));

        let expect = compose(&camera, 1280, 720, 480, 640, 90);
        assert_relative_eq!(
            scene.transform().to_cols_array()[..],
            expect.to_cols_array()[..],
            epsilon = 1e-6
        );
        // 重算后矩阵保持稳定直到下一次置脏
        assert!(!scene.refresh(&camera));
    }
}
