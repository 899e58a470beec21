//! 对齐信息：两侧行号一一对应的有序序列
//!
//! 不变量：序列在两侧行号上同时单调不减。

use super::diff_mask::DiffMask;
use super::ids::{LineRange, Side};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct AlignmentSide {
    pub line: usize,
    pub mask: DiffMask,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct AlignmentEntry {
    pub old: AlignmentSide,
    pub new: AlignmentSide,
}

impl AlignmentEntry {
    pub fn new(old_line: usize, old_mask: DiffMask, new_line: usize, new_mask: DiffMask) -> Self {
        Self {
            old: AlignmentSide {
                line: old_line,
                mask: old_mask,
            },
            new: AlignmentSide {
                line: new_line,
                mask: new_mask,
            },
        }
    }

    pub fn side(&self, side: Side) -> &AlignmentSide {
        match side {
            Side::Old => &self.old,
            Side::New => &self.new,
        }
    }

    /// 两侧类型相同：这两行在视觉上必须处于同一高度
    pub fn is_anchor(&self) -> bool {
        self.old.mask == self.new.mask
    }

    fn precedes(&self, next: &AlignmentEntry) -> bool {
        self.old.line <= next.old.line && self.new.line <= next.new.line
    }

    fn shifted(mut self, old_delta: isize, new_delta: isize) -> Self {
        self.old.line = shift_line(self.old.line, old_delta);
        self.new.line = shift_line(self.new.line, new_delta);
        self
    }
}

fn shift_line(line: usize, delta: isize) -> usize {
    (line as isize + delta).max(0) as usize
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignmentInfo {
    entries: Vec<AlignmentEntry>,
}

impl AlignmentInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_monotone(entries: &[AlignmentEntry]) -> bool {
        entries.windows(2).all(|w| w[0].precedes(&w[1]))
    }

    /// 非单调序列返回 None
    pub fn from_entries(entries: Vec<AlignmentEntry>) -> Option<Self> {
        if Self::is_monotone(&entries) {
            Some(Self { entries })
        } else {
            None
        }
    }

    /// 追加一项；会破坏单调性时拒绝并返回 false
    pub fn push(&mut self, entry: AlignmentEntry) -> bool {
        if let Some(last) = self.entries.last() {
            if !last.precedes(&entry) {
                return false;
            }
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[AlignmentEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlignmentEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 第一个带差异的项
    pub fn first_diff(&self) -> Option<&AlignmentEntry> {
        self.entries
            .iter()
            .find(|e| e.old.mask.is_line_diff() || e.new.mask.is_line_diff())
    }

    /// 整体平移（把区间内的相对行号变为文档绝对行号）
    pub fn offset(self, old_offset: usize, new_offset: usize) -> Self {
        let entries = self
            .entries
            .into_iter()
            .map(|e| e.shifted(old_offset as isize, new_offset as isize))
            .collect();
        Self { entries }
    }

    /// 用局部重算结果替换某一段
    ///
    /// `old_section`/`new_section` 为编辑后的行区间，`*_delta` 为该侧编辑新增的净行数。
    /// 区间之前的项保留，区间之后的项按 delta 平移，区间内的项由 `replacement` 取代。
    /// 结果不再单调时保持原状并返回 false。
    pub fn splice(
        &mut self,
        old_section: LineRange,
        old_delta: isize,
        new_section: LineRange,
        new_delta: isize,
        replacement: AlignmentInfo,
    ) -> bool {
        let old_pre_end = pre_edit_end(old_section, old_delta);
        let new_pre_end = pre_edit_end(new_section, new_delta);

        let prefix = self
            .entries
            .iter()
            .copied()
            .filter(|e| e.old.line < old_section.start && e.new.line < new_section.start);
        let suffix = self
            .entries
            .iter()
            .copied()
            .filter(|e| e.old.line >= old_pre_end && e.new.line >= new_pre_end)
            .map(|e| e.shifted(old_delta, new_delta));

        let merged: Vec<AlignmentEntry> = prefix
            .chain(replacement.entries)
            .chain(suffix)
            .collect();

        if !Self::is_monotone(&merged) {
            return false;
        }
        self.entries = merged;
        true
    }
}

fn pre_edit_end(section: LineRange, delta: isize) -> usize {
    let end = section.end() as isize - delta;
    end.max(section.start as isize) as usize
}

impl<'a> IntoIterator for &'a AlignmentInfo {
    type Item = &'a AlignmentEntry;
    type IntoIter = std::slice::Iter<'a, AlignmentEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/alignment.rs"]
mod tests;
