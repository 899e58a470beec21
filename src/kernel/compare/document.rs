//! 比较对中的一侧文档

use std::time::Duration;

use crate::kernel::services::ports::EditorHost;
use crate::models::{BufferId, DocSlot, Side, TempKind, ViewId};

use super::ledger::DeletedSectionLedger;

#[derive(Clone, Debug)]
pub struct ComparedDocument {
    pub buffer: BufferId,
    /// 当前所在视图中的槽位，文档换视图后需要刷新
    pub slot: DocSlot,
    pub name: String,
    pub side: Side,
    pub temp_kind: TempKind,
    pub home_view: ViewId,
    pub compare_view: ViewId,
    pub home_position: usize,
    pub ledger: DeletedSectionLedger,
}

impl ComparedDocument {
    /// 以宿主当前文档初始化
    pub fn from_current(
        host: &dyn EditorHost,
        side: Side,
        replace_window: Duration,
    ) -> Option<Self> {
        let buffer = host.current_buffer()?;
        let view = host.view_of(buffer)?;
        Some(Self {
            buffer,
            slot: host.slot_in_view(view)?,
            name: host.full_path(buffer),
            side,
            temp_kind: TempKind::None,
            home_view: view,
            compare_view: view,
            home_position: host.position_of(buffer).unwrap_or(0),
            ledger: DeletedSectionLedger::new(replace_window),
        })
    }

    pub fn is_temp(&self) -> bool {
        self.temp_kind.is_temp()
    }

    pub fn is_open(&self, host: &dyn EditorHost) -> bool {
        host.view_of(self.buffer).is_some()
    }

    /// 文件名部分，用于提示文本
    pub fn file_name(&self) -> &str {
        self.name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.name.as_str())
    }

    /// Old 固定在配置的视图，New 在另一侧
    pub fn assign_compare_view(&mut self, old_file_view: ViewId) {
        self.compare_view = match self.side {
            Side::Old => old_file_view,
            Side::New => old_file_view.other(),
        };
    }

    /// 文档换了视图后刷新槽位与临时标签
    pub fn refresh_from_host(&mut self, host: &mut dyn EditorHost) {
        if let Some(view) = host.view_of(self.buffer) {
            if host.buffer_in_view(view) == Some(self.buffer) {
                if let Some(slot) = host.slot_in_view(view) {
                    self.slot = slot;
                }
            }
        }
        if self.is_temp() {
            let label = host.label(self.buffer);
            let suffix = self.temp_kind.label_suffix();
            if !label.ends_with(suffix) {
                host.set_label(self.buffer, &format!("{}{}", label, suffix));
            }
        }
    }

    /// 清除整篇文档的标记与填充，并清空台账
    pub fn clear(&mut self, host: &mut dyn EditorHost) {
        if let Some(view) = host.view_of(self.buffer) {
            if host.buffer_in_view(view) == Some(self.buffer) {
                clear_view(host, view);
            }
        }
        self.ledger.clear();
    }

    /// 关闭前：激活自身并清空视图；临时文档标记为已保存，避免宿主询问
    pub fn before_close(&self, host: &mut dyn EditorHost) {
        host.activate(self.buffer);
        let view = host.current_view();
        clear_view(host, view);
        if self.is_temp() {
            host.set_save_point(view);
        }
    }

    /// 文档已关闭：临时文档的存储一并丢弃
    pub fn after_close(&self, host: &mut dyn EditorHost) {
        if self.is_temp() {
            host.discard_storage(&self.name);
        }
    }

    pub fn close(&self, host: &mut dyn EditorHost) {
        tracing::debug!(buffer = %self.buffer, temp = self.is_temp(), "close compared document");
        self.before_close(host);
        host.close(self.buffer);
        self.after_close(host);
    }

    /// 临时文档直接关闭；其余移回原视图与原位置
    pub fn restore(&self, host: &mut dyn EditorHost) {
        if self.is_temp() {
            self.close(host);
            return;
        }

        host.activate(self.buffer);
        let view = host.current_view();
        clear_view(host, view);

        if host.view_of(self.buffer) == Some(self.home_view) {
            return;
        }

        host.move_to_other_view();

        let Some(current) = host.position_of(self.buffer) else {
            return;
        };
        if self.home_position >= current {
            return;
        }
        for _ in 0..current - self.home_position {
            host.move_tab_backward();
        }
    }
}

/// 清除视图中当前文档的全部标记与填充
pub fn clear_view(host: &mut dyn EditorHost, view: ViewId) {
    let count = host.line_count(view);
    for line in 0..count {
        host.clear_markers(view, line);
        if host.padding_before(view, line) > 0 {
            host.set_padding_before(view, line, 0);
        }
    }
    if host.padding_before(view, count) > 0 {
        host.set_padding_before(view, count, 0);
    }
}
