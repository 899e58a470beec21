//! 外部 diff 引擎契约
//!
//! 引擎只看到两段文本行，返回的行号与标记均相对各自区间起点。

use crate::models::{AlignmentInfo, DiffMask};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CompareOptions {
    pub ignore_spaces: bool,
    pub ignore_case: bool,
    pub detect_moves: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub alignment: AlignmentInfo,
    /// 旧侧每行的标记，下标为区间内偏移
    pub old_markers: Vec<DiffMask>,
    pub new_markers: Vec<DiffMask>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompareResult {
    Match,
    Mismatch(DiffReport),
}

impl CompareResult {
    pub fn is_match(&self) -> bool {
        matches!(self, CompareResult::Match)
    }
}

/// 对相同输入必须给出相同结果
pub trait DiffEngine {
    fn compare(&self, old: &[String], new: &[String], options: CompareOptions) -> CompareResult;
}
