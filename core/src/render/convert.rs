//! 平面 4:2:0 → 半平面（NV12）像素转换
//!
//! 纯函数：把三个独立平面（Y / U / V）重排为一个满分辨率亮度区
//! 加一个 UV 交错色度区的连续缓冲，可直接整体上传。

/// 4:2:0 子采样下色度平面的单轴尺寸（向上取整）
#[must_use]
pub const fn chroma_dim(n: u32) -> u32 {
    (n + 1) >> 1
}

/// 目标缓冲所需的字节数：亮度区 `pitch × height` 加色度区
/// `pitch × ceil(height/2)`
#[must_use]
pub const fn nv12_buffer_len(dst_pitch: usize, height: u32) -> usize {
    dst_pitch * (height as usize + chroma_dim(height) as usize)
}

/// 将平面 4:2:0 帧转换为半平面布局写入 `dst`
///
/// - 亮度：逐行复制 `min(src_stride_y, dst_pitch)` 字节，源按自身
///   跨度推进，目标始终按 `dst_pitch` 推进——行尾的填充字节不被
///   触碰，由调用方预先清零。源平面最后一行允许不含行尾填充
///   （解码器常见输出），复制量收紧到实际存在的字节数。
/// - 色度：对 `ceil(height/2)` 行、`ceil(width/2)` 列，把 `U[col]`、
///   `V[col]` 交错写入连续目标字节，追加在整个亮度区之后，行粒度
///   同样为 `dst_pitch`。
///
/// 调用方保证 `dst.len() >= nv12_buffer_len(dst_pitch, height)`、
/// `dst_pitch >= 2 * ceil(width/2)`，且各源平面至少容纳前
/// `行数 - 1` 个整跨度行加最后一行的有效字节。
pub fn yuv420p_to_nv12(
    dst: &mut [u8],
    width: u32,
    height: u32,
    dst_pitch: usize,
    planes: [&[u8]; 3],
    strides: [usize; 3],
) {
    let h = height as usize;
    let half_w = chroma_dim(width) as usize;
    let half_h = chroma_dim(height) as usize;
    let [y_plane, u_plane, v_plane] = planes;

    // 亮度区
    let y_copy = strides[0].min(dst_pitch);
    for row in 0..h {
        let start = row * strides[0];
        // 最后一行可能没有行尾填充，不读取不存在的字节
        let copy = y_copy.min(y_plane.len() - start);
        dst[row * dst_pitch..row * dst_pitch + copy]
            .copy_from_slice(&y_plane[start..start + copy]);
    }

    // 色度区：UV 交错
    let chroma_base = h * dst_pitch;
    for row in 0..half_h {
        let dst_row = chroma_base + row * dst_pitch;
        let u_row = row * strides[1];
        let v_row = row * strides[2];
        for col in 0..half_w {
            dst[dst_row + col * 2] = u_plane[u_row + col];
            dst[dst_row + col * 2 + 1] = v_plane[v_row + col];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造平铺跨度的三平面帧
    fn tight_planes(width: u32, height: u32) -> ([Vec<u8>; 3], [usize; 3]) {
        let w = width as usize;
        let h = height as usize;
        let cw = chroma_dim(width) as usize;
        let ch = chroma_dim(height) as usize;
        (
            [vec![0u8; w * h], vec![0u8; cw * ch], vec![0u8; cw * ch]],
            [w, cw, cw],
        )
    }

    #[test]
    fn test_region_lengths_even_dimensions() {
        let (w, h) = (16u32, 8u32);
        let pitch = w as usize;
        let (mut planes, strides) = tight_planes(w, h);
        planes[1].fill(1);
        planes[2].fill(2);
        let mut dst = vec![0u8; nv12_buffer_len(pitch, h)];
        yuv420p_to_nv12(
            &mut dst,
            w,
            h,
            pitch,
            [&planes[0], &planes[1], &planes[2]],
            strides,
        );

        // 亮度区长度 = height × dst_pitch
        let luma_len = h as usize * pitch;
        assert_eq!(dst.len() - luma_len, pitch * chroma_dim(h) as usize);
        // 色度区每行写入 2 × ceil(w/2) 字节，总写入字节数符合子采样
        let written: usize = dst[luma_len..].iter().filter(|&&b| b != 0).count();
        assert_eq!(
            written,
            2 * chroma_dim(w) as usize * chroma_dim(h) as usize
        );
    }

    #[test]
    fn test_chroma_interleave_round_trip() {
        // U 全 1、V 全 2 时，色度区每行偶数字节为 1、奇数字节为 2
        let (w, h) = (8u32, 6u32);
        let pitch = w as usize;
        let (mut planes, strides) = tight_planes(w, h);
        for (x, byte) in planes[0].iter_mut().enumerate() {
            *byte = (x % w as usize) as u8;
        }
        planes[1].fill(1);
        planes[2].fill(2);
        let mut dst = vec![0u8; nv12_buffer_len(pitch, h)];
        yuv420p_to_nv12(
            &mut dst,
            w,
            h,
            pitch,
            [&planes[0], &planes[1], &planes[2]],
            strides,
        );

        // 亮度区保持 Y[x,y] = x
        for row in 0..h as usize {
            for col in 0..w as usize {
                assert_eq!(dst[row * pitch + col], col as u8);
            }
        }
        let chroma_base = h as usize * pitch;
        for row in 0..chroma_dim(h) as usize {
            for col in 0..chroma_dim(w) as usize {
                assert_eq!(dst[chroma_base + row * pitch + col * 2], 1);
                assert_eq!(dst[chroma_base + row * pitch + col * 2 + 1], 2);
            }
        }
    }

    #[test]
    fn test_odd_dimensions_round_up() {
        // 奇数宽高：色度尺寸按 (n+1)>>1 向上取整，最后的半行/半列仍被产出
        let (w, h) = (5u32, 3u32);
        assert_eq!(chroma_dim(w), 3);
        assert_eq!(chroma_dim(h), 2);
        let pitch = 2 * chroma_dim(w) as usize; // 6，保证色度行放得下
        let (mut planes, strides) = tight_planes(w, h);
        planes[1].fill(7);
        planes[2].fill(9);
        let mut dst = vec![0u8; nv12_buffer_len(pitch, h)];
        yuv420p_to_nv12(
            &mut dst,
            w,
            h,
            pitch,
            [&planes[0], &planes[1], &planes[2]],
            strides,
        );
        let chroma_base = h as usize * pitch;
        // 最后一列（来自奇数宽度的向上取整）同样成对写入
        assert_eq!(dst[chroma_base + 2 * 2], 7);
        assert_eq!(dst[chroma_base + 2 * 2 + 1], 9);
        assert_eq!(dst[chroma_base + pitch + 2 * 2], 7);
    }

    #[test]
    fn test_source_stride_wider_than_pitch() {
        // 源跨度大于目标行距时，每行只读 dst_pitch 字节，不越界
        let (w, h) = (4u32, 2u32);
        let src_stride = 8usize;
        let pitch = w as usize;
        let mut y_plane = vec![0xEEu8; src_stride * h as usize];
        for row in 0..h as usize {
            for col in 0..w as usize {
                y_plane[row * src_stride + col] = (row * 10 + col) as u8;
            }
        }
        let cw = chroma_dim(w) as usize;
        let u_plane = vec![1u8; cw * chroma_dim(h) as usize];
        let v_plane = vec![2u8; cw * chroma_dim(h) as usize];
        let mut dst = vec![0u8; nv12_buffer_len(pitch, h)];
        yuv420p_to_nv12(
            &mut dst,
            w,
            h,
            pitch,
            [&y_plane, &u_plane, &v_plane],
            [src_stride, cw, cw],
        );
        assert_eq!(&dst[..4], &[0, 1, 2, 3]);
        assert_eq!(&dst[pitch..pitch + 4], &[10, 11, 12, 13]);
        // 行尾的 0xEE 填充字节未被带入
        assert!(!dst.contains(&0xEE));
    }

    #[test]
    fn test_last_row_without_tail_padding() {
        // 源跨度大于行宽且最后一行不带行尾填充时，最后一行只复制
        // 实际存在的字节，不读越界
        let (w, h) = (64u32, 48u32);
        let stride = 96usize;
        let pitch = stride;
        let y_plane = vec![3u8; stride * (h as usize - 1) + w as usize];
        let cw = chroma_dim(w) as usize;
        let ch = chroma_dim(h) as usize;
        let u_plane = vec![1u8; stride * (ch - 1) + cw];
        let v_plane = vec![2u8; stride * (ch - 1) + cw];
        let mut dst = vec![0u8; nv12_buffer_len(pitch, h)];
        yuv420p_to_nv12(
            &mut dst,
            w,
            h,
            pitch,
            [&y_plane, &u_plane, &v_plane],
            [stride, stride, stride],
        );
        // 最后一行的有效区写入，缺失的行尾保持清零值
        let last_row = (h as usize - 1) * pitch;
        assert_eq!(&dst[last_row..last_row + w as usize], &vec![3u8; w as usize][..]);
        assert_eq!(&dst[last_row + w as usize..last_row + pitch], &vec![0u8; pitch - w as usize][..]);
        let chroma_base = h as usize * pitch;
        assert_eq!(&dst[chroma_base..chroma_base + 4], &[1, 2, 1, 2]);
    }

    #[test]
    fn test_pitch_wider_than_source_leaves_padding() {
        // 目标行距大于源宽度时，行尾填充保持调用方的清零值
        let (w, h) = (4u32, 2u32);
        let pitch = 8usize;
        let (mut planes, strides) = tight_planes(w, h);
        planes[0].fill(5);
        planes[1].fill(1);
        planes[2].fill(2);
        let mut dst = vec![0u8; nv12_buffer_len(pitch, h)];
        yuv420p_to_nv12(
            &mut dst,
            w,
            h,
            pitch,
            [&planes[0], &planes[1], &planes[2]],
            strides,
        );
        assert_eq!(&dst[..4], &[5, 5, 5, 5]);
        assert_eq!(&dst[4..8], &[0, 0, 0, 0]);
        let chroma_base = h as usize * pitch;
        assert_eq!(&dst[chroma_base..chroma_base + 4], &[1, 2, 1, 2]);
        assert_eq!(&dst[chroma_base + 4..chroma_base + 8], &[0, 0, 0, 0]);
    }
}
