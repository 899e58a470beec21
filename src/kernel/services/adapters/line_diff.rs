//! 默认的行级 diff 引擎（Myers，基于 similar）
//!
//! 每个差异块产生一项对齐信息；两侧长度不同的块之后再补一个匹配锚点，
//! 让后续相同行在两个视图中对齐。

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use similar::{Algorithm, DiffOp, TextDiff};

use crate::kernel::services::ports::{CompareOptions, CompareResult, DiffEngine, DiffReport};
use crate::models::{AlignmentEntry, AlignmentInfo, DiffMask};

#[derive(Clone, Debug)]
pub struct LineDiffEngine {
    algorithm: Algorithm,
}

impl Default for LineDiffEngine {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Myers,
        }
    }
}

impl LineDiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }
}

fn normalize<'a>(line: &'a str, options: CompareOptions) -> Cow<'a, str> {
    let mut key = Cow::Borrowed(line);
    if options.ignore_spaces {
        key = Cow::Owned(key.chars().filter(|c| !c.is_whitespace()).collect());
    }
    if options.ignore_case {
        key = Cow::Owned(key.to_lowercase());
    }
    key
}

fn mark(markers: &mut [DiffMask], start: usize, len: usize, mask: DiffMask) {
    for slot in markers.iter_mut().skip(start).take(len) {
        *slot |= mask;
    }
}

impl DiffEngine for LineDiffEngine {
    fn compare(&self, old: &[String], new: &[String], options: CompareOptions) -> CompareResult {
        let old_keys: Vec<Cow<'_, str>> = old.iter().map(|l| normalize(l, options)).collect();
        let new_keys: Vec<Cow<'_, str>> = new.iter().map(|l| normalize(l, options)).collect();

        if old_keys == new_keys {
            return CompareResult::Match;
        }

        let old_refs: Vec<&str> = old_keys.iter().map(|k| k.as_ref()).collect();
        let new_refs: Vec<&str> = new_keys.iter().map(|k| k.as_ref()).collect();
        let diff = TextDiff::configure()
            .algorithm(self.algorithm)
            .diff_slices(&old_refs, &new_refs);

        let mut old_markers = vec![DiffMask::empty(); old.len()];
        let mut new_markers = vec![DiffMask::empty(); new.len()];
        let mut alignment = AlignmentInfo::new();
        let none = DiffMask::empty();

        for op in diff.ops() {
            match *op {
                DiffOp::Equal { .. } => {}
                DiffOp::Delete {
                    old_index,
                    old_len,
                    new_index,
                } => {
                    mark(&mut old_markers, old_index, old_len, DiffMask::REMOVED);
                    alignment.push(AlignmentEntry::new(old_index, DiffMask::REMOVED, new_index, none));
                    alignment.push(AlignmentEntry::new(old_index + old_len, none, new_index, none));
                }
                DiffOp::Insert {
                    old_index,
                    new_index,
                    new_len,
                } => {
                    mark(&mut new_markers, new_index, new_len, DiffMask::ADDED);
                    alignment.push(AlignmentEntry::new(old_index, none, new_index, DiffMask::ADDED));
                    alignment.push(AlignmentEntry::new(old_index, none, new_index + new_len, none));
                }
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => {
                    let common = old_len.min(new_len);
                    mark(&mut old_markers, old_index, common, DiffMask::CHANGED);
                    mark(&mut new_markers, new_index, common, DiffMask::CHANGED);
                    mark(&mut old_markers, old_index + common, old_len - common, DiffMask::REMOVED);
                    mark(&mut new_markers, new_index + common, new_len - common, DiffMask::ADDED);

                    alignment.push(AlignmentEntry::new(
                        old_index,
                        DiffMask::CHANGED,
                        new_index,
                        DiffMask::CHANGED,
                    ));
                    if old_len != new_len {
                        alignment.push(AlignmentEntry::new(
                            old_index + old_len,
                            none,
                            new_index + new_len,
                            none,
                        ));
                    }
                }
            }
        }

        if options.detect_moves {
            detect_moves(&old_keys, &new_keys, &mut old_markers, &mut new_markers);
        }

        CompareResult::Mismatch(DiffReport {
            alignment,
            old_markers,
            new_markers,
        })
    }
}

/// 一侧删除、另一侧在别处新增的相同行标为移动
fn detect_moves(
    old_keys: &[Cow<'_, str>],
    new_keys: &[Cow<'_, str>],
    old_markers: &mut [DiffMask],
    new_markers: &mut [DiffMask],
) {
    let mut added: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
    for (line, key) in new_keys.iter().enumerate().rev() {
        if new_markers[line].contains(DiffMask::ADDED) && !key.trim().is_empty() {
            added.entry(key.as_ref()).or_default().push(line);
        }
    }

    for (line, key) in old_keys.iter().enumerate() {
        if !old_markers[line].contains(DiffMask::REMOVED) {
            continue;
        }
        let Some(candidates) = added.get_mut(key.as_ref()) else {
            continue;
        };
        let Some(new_line) = candidates.pop() else {
            continue;
        };
        old_markers[line] = DiffMask::MOVED;
        new_markers[new_line] = DiffMask::MOVED;
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/line_diff.rs"]
mod tests;
