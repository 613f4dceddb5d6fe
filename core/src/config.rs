//! 系统配置定义与解析

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Deserializer};

/// 系统运行时配置
#[derive(Deserialize, Clone)]
pub struct Sys {
    /// 窗口配置
    #[serde(default)]
    pub window: Window,
    /// 播放循环配置
    #[serde(default)]
    pub playback: Playback,
}

/// 窗口配置
#[derive(Deserialize, Clone)]
pub struct Window {
    /// 初始宽度（像素）
    pub width: u32,
    /// 初始高度（像素）
    pub height: u32,
    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,
}

/// 播放循环配置
#[derive(Deserialize, Clone)]
pub struct Playback {
    #[serde(rename = "tick_ms", deserialize_with = "de_duration_ms", default = "default_tick")]
    /// 解码循环每次迭代之间的休眠间隔
    pub tick: Duration,
    /// 每隔多少帧自动旋转 90°（None 表示不自动旋转）
    #[serde(default)]
    pub rotate_every_frames: Option<u64>,
}

fn default_title() -> String {
    "ViStream".to_owned()
}

const fn default_tick() -> Duration {
    Duration::from_millis(10)
}

impl Default for Window {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            title: default_title(),
        }
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            tick: default_tick(),
            rotate_every_frames: None,
        }
    }
}

impl Default for Sys {
    fn default() -> Self {
        Self {
            window: Window::default(),
            playback: Playback::default(),
        }
    }
}

/// 从 TOML 字符串解析系统配置
///
/// # Errors
///
/// - TOML 解析失败
/// - 配置字段反序列化失败
pub fn parse_sys_str(s: &str) -> Result<Sys> {
    let cfg: Sys = toml::from_str(s)?;
    Ok(cfg)
}

/// 从指定路径加载系统配置（TOML）
///
/// # Errors
///
/// - 读取文件失败
/// - TOML 解析失败
pub fn load_sys(path: &Path) -> Result<Sys> {
    let s = std::fs::read_to_string(path)?;
    parse_sys_str(&s)
}

/// 从指定路径加载系统配置；文件不存在时回退到默认值
///
/// 只有"文件不存在"才回退，已存在但损坏的配置照常报错，
/// 不会被默认值悄悄掩盖。
///
/// # Errors
///
/// - 读取文件失败（文件不存在除外）
/// - TOML 解析失败
pub fn load_sys_or_default(path: &Path) -> Result<Sys> {
    match std::fs::read_to_string(path) {
        Ok(s) => parse_sys_str(&s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Sys::default()),
        Err(e) => Err(e.into()),
    }
}

/// 反序列化毫秒为 `Duration`
fn de_duration_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}
