//! 活动比较对的注册表 + 正在构建的暂存对
//!
//! 比较对数量很少，查找均为线性扫描；对外只暴露下标，
//! 回调中途增删元素时调用方按下标重新查找。

use crate::kernel::services::ports::EditorHost;
use crate::models::{BufferId, DocSlot, TempKind, ViewId};

use super::document::ComparedDocument;
use super::pair::ComparedPair;

/// 已选定第一侧、等待第二侧的暂存对
#[derive(Clone, Debug)]
pub struct Staging {
    pub first: ComparedDocument,
    /// 改写标签前的原标签
    pub marked_label: Option<String>,
    /// 第二侧为快照时的临时类型
    pub second_temp: TempKind,
}

#[derive(Debug, Default)]
pub struct CompareRegistry {
    pairs: Vec<ComparedPair>,
    staging: Option<Staging>,
}

impl CompareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 调用方负责保证两侧文档不在其他比较对中
    pub fn register(&mut self, pair: ComparedPair) -> usize {
        tracing::debug!(old = %pair.old.buffer, new = %pair.new.buffer, "register compare pair");
        self.pairs.push(pair);
        self.pairs.len() - 1
    }

    pub fn find_by_document(&self, buffer: BufferId) -> Option<usize> {
        self.pairs.iter().position(|pair| pair.contains(buffer))
    }

    /// 按视图槽位查找（文档在视图间移动后槽位会变）
    pub fn find_by_slot(&self, view: ViewId, slot: DocSlot) -> Option<usize> {
        self.pairs.iter().position(|pair| {
            [&pair.old, &pair.new]
                .into_iter()
                .any(|doc| doc.compare_view == view && doc.slot == slot)
        })
    }

    pub fn is_compared(&self, buffer: BufferId) -> bool {
        self.find_by_document(buffer).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&ComparedPair> {
        self.pairs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ComparedPair> {
        self.pairs.get_mut(index)
    }

    pub fn pair_of(&self, buffer: BufferId) -> Option<&ComparedPair> {
        self.find_by_document(buffer).and_then(|index| self.pairs.get(index))
    }

    pub fn pair_of_mut(&mut self, buffer: BufferId) -> Option<&mut ComparedPair> {
        self.find_by_document(buffer)
            .and_then(move |index| self.pairs.get_mut(index))
    }

    /// 只移除记录，不触碰文档
    pub fn unregister(&mut self, index: usize) -> Option<ComparedPair> {
        if index >= self.pairs.len() {
            return None;
        }
        let pair = self.pairs.remove(index);
        tracing::debug!(old = %pair.old.buffer, new = %pair.new.buffer, "unregister compare pair");
        Some(pair)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComparedPair> {
        self.pairs.iter()
    }

    /// 按注册顺序的逆序取出全部比较对
    pub fn drain_newest_first(&mut self) -> Vec<ComparedPair> {
        let mut pairs = std::mem::take(&mut self.pairs);
        pairs.reverse();
        pairs
    }

    pub fn staging(&self) -> Option<&Staging> {
        self.staging.as_ref()
    }

    pub fn staging_mut(&mut self) -> Option<&mut Staging> {
        self.staging.as_mut()
    }

    pub fn has_staging(&self) -> bool {
        self.staging.is_some()
    }

    /// 设置新的暂存对，旧的先复位
    pub fn stage(&mut self, host: &mut dyn EditorHost, staging: Staging) {
        self.reset_staging(host);
        tracing::debug!(buffer = %staging.first.buffer, side = staging.first.side.name(), "stage first");
        self.staging = Some(staging);
    }

    /// 取出暂存对，不恢复标签
    pub fn take_staging(&mut self) -> Option<Staging> {
        self.staging.take()
    }

    /// 丢弃暂存对并恢复被改写的标签
    pub fn reset_staging(&mut self, host: &mut dyn EditorHost) {
        let Some(staging) = self.staging.take() else {
            return;
        };
        if let Some(label) = staging.marked_label {
            if staging.first.is_open(host) {
                host.set_label(staging.first.buffer, &label);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compare/registry.rs"]
mod tests;
