//! # ViStream 主程序

use std::{
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

use anyhow::Result;
use clap::Parser;
use tracing::info;

use vistream::{
    config::{load_sys, load_sys_or_default},
    logging,
    loops::{ControlMsg, VisualMsg, playback},
    media::{FrameSource, TestPatternSource},
};

#[derive(Parser)]
/// 命令行参数
struct ExecArgs {
    #[arg(long)]
    /// 要播放的视频文件路径（缺省时播放合成测试图样）
    video: Option<PathBuf>,
    #[arg(long)]
    /// 配置文件路径（缺省时尝试 config_sys.toml）
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = ExecArgs::parse();
    logging::init_logging();
    let sys = match args.config {
        Some(path) => load_sys(&path)?,
        None => load_sys_or_default(Path::new("config_sys.toml"))?,
    };

    let source = open_source(args.video)?;
    let (video_w, video_h) = (source.width(), source.height());
    info!(width = video_w, height = video_h, fps = source.fps(), "帧源就绪");

    let (control_tx, control_rx) = mpsc::sync_channel::<ControlMsg>(2);
    let (visual_tx, visual_rx) = mpsc::sync_channel::<VisualMsg>(1);

    let params = playback::PlaybackParams {
        tick: sys.playback.tick,
        rotate_every_frames: sys.playback.rotate_every_frames,
    };
    let _playback_thread = thread::spawn(move || {
        playback::run(source, params, control_rx, visual_tx);
    });

    vistream_winit::run(visual_rx, control_tx, sys.window, (video_w, video_h))?;
    Ok(())
}

/// 打开视频帧源
#[cfg(feature = "ffmpeg")]
fn open_source(video: Option<PathBuf>) -> Result<Box<dyn FrameSource>> {
    use vistream::media::FfmpegSource;
    match video {
        Some(path) => Ok(Box::new(FfmpegSource::new(&path)?)),
        None => Ok(Box::new(TestPatternSource::new(1280, 720, 30.0))),
    }
}

/// 打开视频帧源（未启用 `ffmpeg` feature 时仅支持测试图样）
#[cfg(not(feature = "ffmpeg"))]
fn open_source(video: Option<PathBuf>) -> Result<Box<dyn FrameSource>> {
    if video.is_some() {
        anyhow::bail!("本构建未启用 ffmpeg feature，无法播放视频文件");
    }
    Ok(Box::new(TestPatternSource::new(1280, 720, 30.0)))
}
