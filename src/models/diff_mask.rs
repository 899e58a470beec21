//! 行级 diff 标记

use bitflags::bitflags;

bitflags! {
    /// 每行一个位掩码，由 diff 引擎写入、由宿主渲染
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DiffMask: u32 {
        const CHANGED = 1 << 0;
        const ADDED = 1 << 1;
        const REMOVED = 1 << 2;
        const MOVED = 1 << 3;
        /// 对齐用的空白填充行
        const BLANK = 1 << 4;

        /// 整行差异（不含填充）
        const LINE = Self::CHANGED.bits()
            | Self::ADDED.bits()
            | Self::REMOVED.bits()
            | Self::MOVED.bits();
        const ALL = Self::LINE.bits() | Self::BLANK.bits();
    }
}

impl DiffMask {
    /// 该行是否带有整行差异标记
    pub fn is_line_diff(self) -> bool {
        self.intersects(DiffMask::LINE)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/diff_mask.rs"]
mod tests;
