use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::ViewId;

use super::diff::CompareOptions;

/// 比较行为配置（只读，启动时从 JSON 加载）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// 旧文件放在哪个视图
    pub old_file_view: ViewId,
    /// 先标记的文件作为旧文件
    pub old_file_is_first: bool,
    /// 单文件比较时与前一个标签比较
    pub compare_to_prev: bool,
    pub encodings_check: bool,
    pub prompt_to_close_on_match: bool,
    pub go_to_first_diff: bool,
    pub recompare_on_save: bool,
    pub update_on_change: bool,
    pub wrap_around: bool,
    pub ignore_spaces: bool,
    pub ignore_case: bool,
    pub detect_moves: bool,
    pub timing: TimingConfig,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            old_file_view: ViewId::Main,
            old_file_is_first: true,
            compare_to_prev: false,
            encodings_check: true,
            prompt_to_close_on_match: false,
            go_to_first_diff: false,
            recompare_on_save: true,
            update_on_change: true,
            wrap_around: false,
            ignore_spaces: false,
            ignore_case: false,
            detect_moves: true,
            timing: TimingConfig::default(),
        }
    }
}

impl CompareConfig {
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            ignore_spaces: self.ignore_spaces,
            ignore_case: self.ignore_case,
            detect_moves: self.detect_moves,
        }
    }
}

/// 各类延迟（毫秒）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// 删除后多久内的插入视为“整行替换”
    pub line_replace_window_ms: u64,
    pub realign_delay_ms: u64,
    pub update_delay_ms: u64,
    pub save_recompare_delay_ms: u64,
    pub activation_delay_ms: u64,
    pub close_delay_ms: u64,
    pub restore_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            line_replace_window_ms: 40,
            realign_delay_ms: 10,
            update_delay_ms: 10,
            save_recompare_delay_ms: 30,
            activation_delay_ms: 30,
            close_delay_ms: 30,
            restore_delay_ms: 100,
        }
    }
}

impl TimingConfig {
    pub fn line_replace_window(&self) -> Duration {
        Duration::from_millis(self.line_replace_window_ms)
    }

    pub fn realign_delay(&self) -> Duration {
        Duration::from_millis(self.realign_delay_ms)
    }

    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }

    pub fn save_recompare_delay(&self) -> Duration {
        Duration::from_millis(self.save_recompare_delay_ms)
    }

    pub fn activation_delay(&self) -> Duration {
        Duration::from_millis(self.activation_delay_ms)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    pub fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }
}
