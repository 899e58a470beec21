//! 比较会话：持有注册表、调度器与通知锁
//!
//! 宿主把命令、通知和定时器到期分别交给 `CompareSession` 的命令方法、
//! `notify` 与 `tick`。宿主本身按调用传入，会话不持有它。

use std::time::Instant;

use crate::kernel::services::ports::{
    CompareConfig, CompareResult, DiffEngine, EditorHost, LineMarkers, Modification,
    ModificationKind, Notice, Notification, Question, UserPrompt, ViewMarkers,
};
use crate::models::{
    AlignmentEntry, AlignmentInfo, BufferId, DiffMask, LineRange, Side, TempKind, VcsKind, ViewId,
};

use super::align::{self, Jump, ViewLocation};
use super::document::{clear_view, ComparedDocument};
use super::error::{CompareError, Result};
use super::lock::{NotificationGuard, NotificationLock};
use super::pair::{ComparedPair, PairState};
use super::registry::{CompareRegistry, Staging};
use super::scheduler::{RecomputeRequest, Scheduler, Task, TaskKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompareOutcome {
    /// 差异已标记，比较对处于活动状态
    Mismatch,
    /// 两侧相同，比较对已移除
    MatchRemoved,
    /// 两侧相同，标记已清除但比较对保留
    MatchKept,
}

pub struct CompareSession<E, P> {
    config: CompareConfig,
    registry: CompareRegistry,
    scheduler: Scheduler,
    lock: NotificationLock,
    engine: E,
    prompt: P,
    compare_mode: bool,
    stored_location: Option<ViewLocation>,
    go_to_first: bool,
    minimized: Option<NotificationGuard>,
}

impl<E: DiffEngine, P: UserPrompt> CompareSession<E, P> {
    pub fn new(config: CompareConfig, engine: E, prompt: P) -> Self {
        Self {
            config,
            registry: CompareRegistry::new(),
            scheduler: Scheduler::new(),
            lock: NotificationLock::new(),
            engine,
            prompt,
            compare_mode: false,
            stored_location: None,
            go_to_first: false,
            minimized: None,
        }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn registry(&self) -> &CompareRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// 宿主需要共享同一把锁，才能识别由会话自身引发的通知
    pub fn notification_lock(&self) -> NotificationLock {
        self.lock.clone()
    }

    pub fn is_compare_mode(&self) -> bool {
        self.compare_mode
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn pair_of(&self, buffer: BufferId) -> Option<&ComparedPair> {
        self.registry.pair_of(buffer)
    }

    fn fail(&mut self, err: CompareError) -> CompareError {
        if let Some(notice) = err.notice() {
            self.prompt.notify(&notice);
        }
        tracing::info!(error = %err, "compare command aborted");
        err
    }

    // ---- 命令 ----

    pub fn set_as_first(&mut self, host: &mut dyn EditorHost) -> Result<()> {
        let side = if self.config.old_file_is_first {
            Side::Old
        } else {
            Side::New
        };
        let result = self.set_first(host, side, true);
        if result.is_err() {
            self.registry.reset_staging(host);
        }
        result
    }

    fn set_first(&mut self, host: &mut dyn EditorHost, side: Side, mark_label: bool) -> Result<()> {
        let Some(current) = host.current_buffer() else {
            return Err(self.fail(CompareError::OnlyOneDocument));
        };
        if self.registry.is_compared(current) {
            let name = host.label(current);
            return Err(self.fail(CompareError::AlreadyCompared { name }));
        }

        self.registry.reset_staging(host);

        let window = self.config.timing.line_replace_window();
        let Some(first) = ComparedDocument::from_current(host, side, window) else {
            return Err(self.fail(CompareError::OnlyOneDocument));
        };

        let marked_label = if mark_label {
            let label = host.label(current);
            host.set_label(current, &format!("{} ** {} to Compare", label, side.name()));
            Some(label)
        } else {
            None
        };

        self.registry.stage(
            host,
            Staging {
                first,
                marked_label,
                second_temp: TempKind::None,
            },
        );
        Ok(())
    }

    pub fn compare(&mut self, host: &mut dyn EditorHost, now: Instant) -> Result<CompareOutcome> {
        self.run_compare_command(host, false, now)
    }

    pub fn compare_selected_lines(
        &mut self,
        host: &mut dyn EditorHost,
        now: Instant,
    ) -> Result<CompareOutcome> {
        self.run_compare_command(host, true, now)
    }

    fn run_compare_command(
        &mut self,
        host: &mut dyn EditorHost,
        selection: bool,
        now: Instant,
    ) -> Result<CompareOutcome> {
        let _guard = self.lock.acquire();

        let double_view = !host.is_single_view();
        let Some(current) = host.current_buffer() else {
            return Err(self.fail(CompareError::OnlyOneDocument));
        };

        self.stored_location = None;
        self.go_to_first = false;

        let index = match self.registry.find_by_document(current) {
            Some(index) => {
                self.registry.reset_staging(host);

                if selection && !self.selections_valid(host, None) {
                    return Err(CompareError::NoSelection);
                }

                let full = self
                    .registry
                    .get(index)
                    .is_some_and(|pair| pair.is_full_compare);
                if full && !self.config.go_to_first_diff && !selection {
                    self.stored_location = Some(ViewLocation::capture(host, host.current_view()));
                }

                if let Some(pair) = self.registry.get_mut(index) {
                    pair.clear_documents(host);
                }
                index
            }
            None => {
                let pair = match self.init_new_compare(host) {
                    Ok(pair) => pair,
                    Err(err) => {
                        self.registry.reset_staging(host);
                        return Err(err);
                    }
                };
                let old_is_temp = pair.old.is_temp();
                let new_buffer = pair.new.buffer;
                let other = pair.other(current).map(|doc| doc.buffer);
                let index = self.registry.register(pair);

                if old_is_temp {
                    host.activate(new_buffer);
                } else {
                    host.activate(current);
                    if selection {
                        let valid = match other {
                            Some(other) => self.selections_valid(host, Some((current, other))),
                            None => false,
                        };
                        if !valid {
                            self.registry.unregister(index);
                            return Err(CompareError::NoSelection);
                        }
                    }
                }

                if self.config.encodings_check && !self.encodings_ok(host, index) {
                    if let Some(current) = host.current_buffer() {
                        self.clear_pair(host, current, now);
                    }
                    return Err(self.fail(CompareError::EncodingMismatchDeclined));
                }
                index
            }
        };

        let Some((result, old_range, new_range)) = self.diff_pair(host, index, selection) else {
            return Err(CompareError::NotCompared);
        };

        match result {
            CompareResult::Mismatch(report) => {
                let options = self.config.compare_options();
                if let Some(pair) = self.registry.get_mut(index) {
                    let old_view = pair.old.compare_view;
                    apply_markers(host, old_view.other(), new_range.start, &report.new_markers);
                    apply_markers(host, old_view, old_range.start, &report.old_markers);
                    pair.alignment = report.alignment.offset(old_range.start, new_range.start);
                    pair.options = options;
                    pair.is_full_compare = !selection;
                    pair.state = PairState::Mismatch;
                }

                self.set_compare_mode(host);

                if self.stored_location.is_none() {
                    if !double_view {
                        host.activate(new_buffer_of(&self.registry, index).unwrap_or(current));
                    }
                    if selection {
                        host.clear_selection(ViewId::Main);
                        host.clear_selection(ViewId::Sub);
                    }
                    self.go_to_first = true;
                }

                self.scheduler
                    .post(Task::Realign, self.config.timing.realign_delay(), now);

                tracing::info!("COMPARE READY");
                Ok(CompareOutcome::Mismatch)
            }
            CompareResult::Match => {
                let outcome = self.handle_match(host, index, selection, now);
                self.stored_location = None;
                Ok(outcome)
            }
        }
    }

    /// 确定第二侧并构造比较对
    fn init_new_compare(&mut self, host: &mut dyn EditorHost) -> Result<ComparedPair> {
        let current = host.current_buffer();
        let first_is_set = match self.registry.staging() {
            Some(staging) => Some(staging.first.buffer) != current,
            None => false,
        };

        if !first_is_set {
            let single_view = host.is_single_view();
            let side = if single_view || host.current_view() != self.config.old_file_view {
                Side::New
            } else {
                Side::Old
            };
            self.set_first(host, side, false)?;

            if single_view {
                if host.document_count(host.current_view()) < 2 {
                    return Err(self.fail(CompareError::OnlyOneDocument));
                }
                host.activate_adjacent(self.config.compare_to_prev);
            } else {
                let other_view = host.current_view().other();
                if let Some(other) = host.buffer_in_view(other_view) {
                    if self.registry.is_compared(other) {
                        let name = host.label(other);
                        return Err(self.fail(CompareError::AlreadyCompared { name }));
                    }
                }
                host.switch_to_other_view();
            }
        }

        let Some(staging) = self.registry.take_staging() else {
            return Err(CompareError::NotCompared);
        };
        if let Some(label) = &staging.marked_label {
            host.set_label(staging.first.buffer, label);
        }

        let window = self.config.timing.line_replace_window();
        let side = staging.first.side.opposite();
        let Some(mut second) = ComparedDocument::from_current(host, side, window) else {
            return Err(self.fail(CompareError::OnlyOneDocument));
        };
        if second.buffer == staging.first.buffer {
            return Err(self.fail(CompareError::OnlyOneDocument));
        }
        second.temp_kind = staging.second_temp;
        second.refresh_from_host(host);

        Ok(ComparedPair::new(staging.first, second))
    }

    /// 两侧都必须有选中的行
    fn selections_valid(
        &mut self,
        host: &mut dyn EditorHost,
        docs: Option<(BufferId, BufferId)>,
    ) -> bool {
        let valid = match docs {
            None => {
                host.selection_lines(ViewId::Sub).is_some()
                    && host.selection_lines(ViewId::Main).is_some()
            }
            Some((current, other)) => {
                let view1 = host.view_of(current);
                let view2 = host.view_of(other);
                let (Some(view1), Some(view2)) = (view1, view2) else {
                    return false;
                };
                let other_selected = if view1 == view2 {
                    host.activate(other);
                    let selected = host.selection_lines(view2).is_some();
                    host.activate(current);
                    selected
                } else {
                    host.selection_lines(view2).is_some()
                };
                other_selected && host.selection_lines(view1).is_some()
            }
        };
        if !valid {
            self.prompt.notify(&Notice::NoSelection);
        }
        valid
    }

    fn encodings_ok(&mut self, host: &dyn EditorHost, index: usize) -> bool {
        let Some(pair) = self.registry.get(index) else {
            return true;
        };
        if host.encoding(pair.old.buffer) == host.encoding(pair.new.buffer) {
            return true;
        }
        self.prompt.confirm(&Question::EncodingMismatch)
    }

    /// 定位两侧并运行 diff 引擎；返回结果及两侧参与比较的行区间
    fn diff_pair(
        &mut self,
        host: &mut dyn EditorHost,
        index: usize,
        selection: bool,
    ) -> Option<(CompareResult, LineRange, LineRange)> {
        let old_file_view = self.config.old_file_view;
        let pair = self.registry.get_mut(index)?;
        pair.position_files(host, old_file_view);

        let old_view = pair.old.compare_view;
        let new_view = pair.new.compare_view;

        let (old_range, new_range) = if selection {
            let main = host.selection_lines(ViewId::Main)?;
            let sub = host.selection_lines(ViewId::Sub)?;
            let mut sel = [LineRange::default(); 2];
            sel[ViewId::Main.index()] = main;
            sel[ViewId::Sub.index()] = sub;
            pair.selections = Some(sel);
            (sel[old_view.index()], sel[new_view.index()])
        } else {
            pair.selections = None;
            (
                LineRange::new(0, host.line_count(old_view)),
                LineRange::new(0, host.line_count(new_view)),
            )
        };

        let old_lines = read_lines(host, old_view, old_range);
        let new_lines = read_lines(host, new_view, new_range);

        tracing::debug!(
            old = %pair.old.name,
            new = %pair.new.name,
            selection,
            "comparing"
        );

        let result = self
            .engine
            .compare(&old_lines, &new_lines, self.config.compare_options());
        Some((result, old_range, new_range))
    }

    fn handle_match(
        &mut self,
        host: &mut dyn EditorHost,
        index: usize,
        selection: bool,
        now: Instant,
    ) -> CompareOutcome {
        let Some(pair) = self.registry.get(index) else {
            return CompareOutcome::MatchRemoved;
        };

        if pair.has_temp() {
            tracing::info!(new = %pair.new.name, "no changes against snapshot, closing it");
            let buffer = pair.new.buffer;
            self.clear_pair(host, buffer, now);
            return CompareOutcome::MatchRemoved;
        }

        let old = pair.old.file_name().to_string();
        let new = pair.new.file_name().to_string();

        if self.config.prompt_to_close_on_match {
            let close = self.prompt.confirm(&Question::CloseMatchedFiles {
                old,
                new,
                selection,
            });
            if close {
                self.close_pair(host, index, now);
                return CompareOutcome::MatchRemoved;
            }
        } else {
            self.prompt.notify(&Notice::FilesMatch {
                old,
                new,
                selection,
            });
        }

        if let Some(pair) = self.registry.get_mut(index) {
            pair.clear_documents(host);
            pair.alignment.clear();
            pair.state = PairState::Match;
            pair.options = self.config.compare_options();
            pair.is_full_compare = !selection;
        }
        CompareOutcome::MatchKept
    }

    /// 还原 `buffer` 所在比较对并移除；不在比较中时什么也不做
    fn clear_pair(&mut self, host: &mut dyn EditorHost, buffer: BufferId, now: Instant) -> bool {
        let Some(index) = self.registry.find_by_document(buffer) else {
            return false;
        };

        let _guard = self.lock.acquire();
        if let Some(mut pair) = self.registry.unregister(index) {
            pair.restore_files(host, Some(buffer));
        }
        if let Some(current) = host.current_buffer() {
            self.on_buffer_activated(host, current, now);
        } else {
            self.set_normal_mode(host);
        }
        true
    }

    /// 关闭两侧文档（先关副视图中的一侧）
    fn close_pair(&mut self, host: &mut dyn EditorHost, index: usize, now: Instant) {
        let current_view = host.current_view();

        let _guard = self.lock.acquire();
        let Some(pair) = self.registry.unregister(index) else {
            return;
        };

        let sub_side = pair.side_of(pair.document_in_view(host, ViewId::Sub).buffer);
        let sub_side = sub_side.unwrap_or(Side::New);
        pair.side(sub_side).close(host);
        pair.side(sub_side.opposite()).close(host);

        if host.is_view_visible(current_view) {
            host.focus_view(current_view);
        }
        if let Some(current) = host.current_buffer() {
            self.on_buffer_activated(host, current, now);
        } else {
            self.set_normal_mode(host);
        }
    }

    /// 清除当前文档所在的比较（以及暂存对）；重复调用无副作用
    pub fn clear_active(&mut self, host: &mut dyn EditorHost, now: Instant) -> bool {
        self.registry.reset_staging(host);
        match host.current_buffer() {
            Some(current) => self.clear_pair(host, current, now),
            None => false,
        }
    }

    pub fn clear_all(&mut self, host: &mut dyn EditorHost) {
        self.registry.reset_staging(host);
        if self.registry.is_empty() {
            return;
        }

        self.scheduler.cancel(TaskKind::Realign);
        self.scheduler.cancel(TaskKind::Recompute);
        self.scheduler.cancel(TaskKind::SettleActivation);

        let current = host.current_buffer();

        let _guard = self.lock.acquire();
        host.switch_to_other_view();
        let other = host.current_buffer();

        for mut pair in self.registry.drain_newest_first() {
            pair.restore_files(host, None);
        }

        self.set_normal_mode(host);

        if !host.is_single_view() {
            if let Some(other) = other.filter(|b| host.view_of(*b).is_some()) {
                host.activate(other);
            }
        }
        if let Some(current) = current.filter(|b| host.view_of(*b).is_some()) {
            host.activate(current);
        }
        tracing::info!("all compares cleared");
    }

    /// 当前文档与其上次保存的内容比较
    pub fn diff_since_last_save(
        &mut self,
        host: &mut dyn EditorHost,
        now: Instant,
    ) -> Result<CompareOutcome> {
        self.compare_with_snapshot(host, TempKind::SnapshotOfLastSave, now)
    }

    /// 当前文档与版本库中的版本比较
    pub fn vcs_diff(
        &mut self,
        host: &mut dyn EditorHost,
        kind: VcsKind,
        now: Instant,
    ) -> Result<CompareOutcome> {
        self.compare_with_snapshot(host, TempKind::SnapshotOfVcsRevision(kind), now)
    }

    fn compare_with_snapshot(
        &mut self,
        host: &mut dyn EditorHost,
        kind: TempKind,
        now: Instant,
    ) -> Result<CompareOutcome> {
        let Some(source) = host.current_buffer() else {
            return Err(self.fail(CompareError::OnlyOneDocument));
        };
        if !host.is_on_disk(source) {
            return Err(self.fail(CompareError::NotOnDisk));
        }

        self.set_first(host, Side::New, false)?;

        let opened = {
            let _guard = self.lock.acquire();
            host.open_snapshot(source, kind)
        };
        if opened.is_none() {
            self.registry.reset_staging(host);
            return Err(self.fail(CompareError::SnapshotFailed));
        }
        if let Some(staging) = self.registry.staging_mut() {
            staging.second_temp = kind;
        }

        self.compare(host, now)
    }

    pub fn toggle_ignore_spaces(&mut self) -> bool {
        self.config.ignore_spaces = !self.config.ignore_spaces;
        self.config.ignore_spaces
    }

    pub fn toggle_ignore_case(&mut self) -> bool {
        self.config.ignore_case = !self.config.ignore_case;
        self.config.ignore_case
    }

    pub fn toggle_detect_moves(&mut self) -> bool {
        self.config.detect_moves = !self.config.detect_moves;
        self.config.detect_moves
    }

    pub fn first_diff(&mut self, host: &mut dyn EditorHost) -> bool {
        self.navigate(host, Jump::First)
    }

    pub fn prev_diff(&mut self, host: &mut dyn EditorHost) -> bool {
        self.navigate(host, Jump::Prev)
    }

    pub fn next_diff(&mut self, host: &mut dyn EditorHost) -> bool {
        self.navigate(host, Jump::Next)
    }

    pub fn last_diff(&mut self, host: &mut dyn EditorHost) -> bool {
        self.navigate(host, Jump::Last)
    }

    fn navigate(&mut self, host: &mut dyn EditorHost, jump: Jump) -> bool {
        if !self.compare_mode {
            return false;
        }
        let _guard = self.lock.acquire();
        match align::jump_to_change(host, jump, self.config.wrap_around) {
            Some(view) => {
                align::sync_views(host, view, &self.lock);
                true
            }
            None => false,
        }
    }

    // ---- 比较模式 ----

    fn set_compare_mode(&mut self, host: &mut dyn EditorHost) {
        if !self.compare_mode {
            self.compare_mode = true;
            host.set_compare_mode(true);
            tracing::debug!("compare mode on");
        }
        let view = host.current_view();
        let zoom = host.zoom(view);
        host.set_zoom(view.other(), zoom);
    }

    fn set_normal_mode(&mut self, host: &mut dyn EditorHost) {
        if self.compare_mode {
            self.compare_mode = false;
            host.set_compare_mode(false);
            host.set_status("");
            tracing::debug!("compare mode off");
        }
    }

    fn compared_file_activated(&mut self, host: &mut dyn EditorHost, now: Instant) {
        self.set_compare_mode(host);
        self.stored_location = Some(ViewLocation::capture(host, host.current_view()));
        self.scheduler
            .post(Task::Realign, self.config.timing.realign_delay(), now);
    }

    // ---- 通知 ----

    pub fn notify(&mut self, host: &mut dyn EditorHost, notification: Notification, now: Instant) {
        match notification {
            Notification::Minimized => {
                if !self.lock.is_locked() {
                    tracing::debug!("host minimized");
                    self.scheduler.cancel(TaskKind::Realign);
                    self.minimized = Some(self.lock.acquire());
                }
                return;
            }
            Notification::Restored => {
                if self.minimized.is_some() {
                    tracing::debug!("host restored");
                    self.scheduler.post(
                        Task::RestoreAfterMinimize,
                        self.config.timing.restore_delay(),
                        now,
                    );
                }
                return;
            }
            Notification::BeforeShutdown => {
                self.minimized = None;
                self.scheduler.cancel(TaskKind::RestoreAfterMinimize);
                self.clear_all(host);
                return;
            }
            Notification::FileBeforeClose(buffer)
                if self
                    .registry
                    .staging()
                    .is_some_and(|staging| staging.first.buffer == buffer) =>
            {
                self.registry.reset_staging(host);
                return;
            }
            _ => {}
        }

        if self.lock.is_locked() {
            return;
        }

        let busy = self.scheduler.is_pending(TaskKind::SettleActivation)
            || self.scheduler.is_pending(TaskKind::ClosePair)
            || self.scheduler.is_pending(TaskKind::Recompute);

        match notification {
            Notification::Painted => {
                if self.compare_mode && !busy {
                    self.scheduler
                        .post(Task::Realign, self.config.timing.realign_delay(), now);
                }
            }
            Notification::UpdateUi { view } => {
                if self.compare_mode
                    && self.stored_location.is_none()
                    && !self.go_to_first
                    && !busy
                    && !self.scheduler.is_pending(TaskKind::Realign)
                {
                    let _guard = self.lock.acquire();
                    align::sync_views(host, view, &self.lock);
                }
            }
            Notification::BufferActivated(buffer) => {
                if !self.registry.is_empty() && !self.scheduler.is_pending(TaskKind::ClosePair) {
                    self.on_buffer_activated(host, buffer, now);
                }
            }
            Notification::FileBeforeClose(buffer) => {
                if !self.registry.is_empty() {
                    self.on_file_before_close(host, buffer, now);
                }
            }
            Notification::FileSaved(buffer) => {
                if !self.registry.is_empty() {
                    self.on_file_saved(host, buffer, now);
                }
            }
            Notification::Modified(modification) => {
                if self.compare_mode {
                    if self.config.update_on_change {
                        self.on_modified_update(host, modification, now);
                    } else {
                        self.on_modified_ledger(host, modification, now);
                    }
                }
            }
            Notification::Zoom => {
                if self.compare_mode {
                    self.on_zoom(host);
                }
            }
            Notification::Minimized | Notification::Restored | Notification::BeforeShutdown => {}
        }
    }

    fn on_buffer_activated(&mut self, host: &mut dyn EditorHost, buffer: BufferId, now: Instant) {
        self.scheduler.cancel(TaskKind::Realign);
        self.scheduler.cancel(TaskKind::SettleActivation);

        if self.registry.is_compared(buffer) {
            self.scheduler.post(
                Task::SettleActivation(buffer),
                self.config.timing.activation_delay(),
                now,
            );
        } else {
            self.set_normal_mode(host);
        }
    }

    fn on_file_before_close(&mut self, host: &mut dyn EditorHost, buffer: BufferId, now: Instant) {
        let Some(index) = self.registry.find_by_document(buffer) else {
            return;
        };

        self.scheduler.cancel(TaskKind::Realign);
        self.scheduler.cancel(TaskKind::Recompute);
        self.scheduler.cancel(TaskKind::SettleActivation);

        let current = host.current_buffer();

        let _guard = self.lock.acquire();
        if let Some(pair) = self.registry.get_mut(index) {
            if let Some(doc) = pair.document(buffer) {
                doc.before_close(host);
            }
            let view = host.view_of(buffer);
            let position = host.position_of(buffer).unwrap_or(0);
            pair.correct_home_position(buffer, view, position);
        }

        if let Some(current) = current.filter(|c| *c != buffer) {
            host.activate(current);
        }

        tracing::debug!(%buffer, "compared document closing");
        self.scheduler.post(
            Task::ClosePair(vec![buffer]),
            self.config.timing.close_delay(),
            now,
        );
    }

    fn on_file_saved(&mut self, host: &mut dyn EditorHost, buffer: BufferId, now: Instant) {
        let Some(pair) = self.registry.pair_of(buffer) else {
            return;
        };
        let Some(other) = pair.other(buffer) else {
            return;
        };
        let other_buffer = other.buffer;
        let other_outdated = other.temp_kind == TempKind::SnapshotOfLastSave;

        let current = host.current_buffer();
        let pair_active = current == Some(buffer) || current == Some(other_buffer);

        let _guard = self.lock.acquire();

        if !pair_active {
            host.activate(buffer);
        }

        if pair_active && self.config.recompare_on_save {
            self.scheduler.cancel(TaskKind::Realign);
            self.scheduler.cancel(TaskKind::Recompute);
            let view = host.view_of(buffer).unwrap_or_else(|| host.current_view());
            self.scheduler.post(
                Task::Recompute(RecomputeRequest::full(view)),
                self.config.timing.save_recompare_delay(),
                now,
            );
        }

        if other_outdated {
            let label = host.label(other_buffer);
            if !label.ends_with(" - Outdated") {
                host.set_label(other_buffer, &format!("{} - Outdated", label));
            }
        }

        if !pair_active {
            if let Some(current) = current {
                host.activate(current);
                self.on_buffer_activated(host, current, now);
            }
        }
    }

    /// 台账模式：删除前记录标记，撤销/重做插入时写回
    fn on_modified_ledger(
        &mut self,
        host: &mut dyn EditorHost,
        modification: Modification,
        now: Instant,
    ) {
        let Some(pair) = self.registry.pair_of_mut(modification.buffer) else {
            return;
        };
        let Some(doc) = pair.document_mut(modification.buffer) else {
            return;
        };
        let mut markers = ViewMarkers::new(host, modification.view);

        match modification.kind {
            ModificationKind::BeforeDelete => {
                if !modification.is_multi_line() {
                    return;
                }
                doc.ledger.push(
                    modification.action,
                    modification.start_line,
                    modification.end_line,
                    &mut markers,
                    now,
                );
            }
            ModificationKind::Insert if modification.lines_added != 0 => {
                doc.ledger.pop(
                    modification.action,
                    modification.start_line,
                    &mut markers,
                    now,
                );
            }
            _ => {}
        }
    }

    /// 即时更新模式：改动合并后做一次局部重新比较
    fn on_modified_update(
        &mut self,
        host: &mut dyn EditorHost,
        modification: Modification,
        now: Instant,
    ) {
        if !self.registry.is_compared(modification.buffer) {
            return;
        }

        match modification.kind {
            ModificationKind::BeforeDelete => {
                if modification.is_multi_line() {
                    let _guard = self.lock.acquire();
                    let mut markers = ViewMarkers::new(host, modification.view);
                    for line in modification.start_line..=modification.end_line {
                        markers.clear_marker(line);
                    }
                }
            }
            ModificationKind::Insert | ModificationKind::Delete => {
                if let Some(Task::Recompute(pending)) = self.scheduler.pending(TaskKind::Recompute)
                {
                    if pending.full_compare {
                        return;
                    }
                }
                let (added, deleted) = match modification.kind {
                    ModificationKind::Insert => (modification.lines_added.max(0) as usize, 0),
                    _ => (0, (-modification.lines_added).max(0) as usize),
                };
                self.scheduler.post(
                    Task::Recompute(RecomputeRequest::edit(
                        modification.view,
                        modification.start_line,
                        added,
                        deleted,
                    )),
                    self.config.timing.update_delay(),
                    now,
                );
            }
        }
    }

    fn on_zoom(&mut self, host: &mut dyn EditorHost) {
        let Some(current) = host.current_buffer() else {
            return;
        };
        if !self.registry.is_compared(current) {
            return;
        }
        let _guard = self.lock.acquire();
        let view = host.current_view();
        let zoom = host.zoom(view);
        host.set_zoom(view.other(), zoom);
    }

    // ---- 延迟任务 ----

    /// 执行所有到期任务，返回执行的个数
    pub fn tick(&mut self, host: &mut dyn EditorHost, now: Instant) -> usize {
        let mut ran = 0;
        while let Some(task) = self.scheduler.pop_due(now) {
            ran += 1;
            tracing::trace!(kind = ?task.kind(), "task fired");
            let _guard = self.lock.acquire();
            match task {
                Task::Realign => self.realign(host),
                Task::Recompute(request) => self.recompute(host, request, now),
                Task::SettleActivation(buffer) => self.settle_activation(host, buffer, now),
                Task::ClosePair(closed) => self.close_closed_pairs(host, closed, now),
                Task::RestoreAfterMinimize => {
                    tracing::debug!("notifications resumed after restore");
                    self.minimized = None;
                }
            }
        }
        ran
    }

    fn realign(&mut self, host: &mut dyn EditorHost) {
        let Some(current) = host.current_buffer() else {
            return;
        };
        let Some(pair) = self.registry.pair_of(current) else {
            return;
        };
        if pair.alignment.is_empty() {
            return;
        }
        let main_side = pair.side_in_view(ViewId::Main);

        let realign = self.go_to_first
            || align::is_alignment_needed(host, ViewId::Main, &pair.alignment, main_side)
            || align::is_alignment_needed(host, ViewId::Sub, &pair.alignment, main_side);

        let _guard = self.lock.acquire();

        if realign {
            tracing::debug!("Aligning diffs");
            if self.stored_location.is_none() && !self.go_to_first {
                self.stored_location = Some(ViewLocation::capture(host, host.current_view()));
            }
            align::align_diffs(host, &pair.alignment, main_side);
        }

        let status = pair.status_text();
        if self.go_to_first {
            tracing::debug!("Go to first diff");
            self.go_to_first = false;
            if let Some(view) = align::jump_to_change(host, Jump::First, false) {
                align::sync_views(host, view, &self.lock);
            }
            host.set_status(&status);
        } else if let Some(location) = self.stored_location.take() {
            location.restore(host);
            align::sync_views(host, location.view, &self.lock);
            host.set_status(&status);
        }
    }

    fn recompute(&mut self, host: &mut dyn EditorHost, request: RecomputeRequest, now: Instant) {
        if request.full_compare {
            let compared = host
                .current_buffer()
                .is_some_and(|current| self.registry.is_compared(current));
            if compared {
                if let Err(err) = self.compare(host, now) {
                    tracing::warn!(error = %err, "recompare failed");
                }
            }
            return;
        }

        let change_view = request.view;
        let other_view = change_view.other();
        let Some(buffer) = host.buffer_in_view(change_view) else {
            return;
        };
        let Some(index) = self.registry.find_by_document(buffer) else {
            return;
        };

        let change_count = host.line_count(change_view);
        let other_count = host.line_count(other_view);
        let delta = request.delta();
        let pre_count = (change_count as isize - delta).max(0) as usize;

        // 同步点取自编辑前的对齐信息：区间外的行在两侧都保持原有对应关系
        let (change_side, change_section, other_section) = {
            let Some(pair) = self.registry.get(index) else {
                return;
            };
            let change_side = pair.side_in_view(change_view);
            let alignment = &pair.alignment;
            let start = request.change_line.min(pre_count);
            let pre_end = request.pre_edit_end().clamp(start, pre_count);

            let lower = (0..=start)
                .rev()
                .find_map(|line| sync_point(alignment, change_side, line))
                .unwrap_or((0, 0));
            let upper = (pre_end..=pre_count)
                .find_map(|line| sync_point(alignment, change_side, line))
                .unwrap_or((pre_count, other_count));

            let change_end = (upper.0 as isize + delta).max(lower.0 as isize) as usize;
            (
                change_side,
                clamp_range(lower.0, change_end - lower.0, change_count),
                clamp_range(lower.1, upper.1.saturating_sub(lower.1), other_count),
            )
        };

        let _guard = self.lock.acquire();
        let blanks = request.lines_added > 0 || request.lines_deleted > 0;
        clear_section(host, change_view, change_section, blanks);
        clear_section(host, other_view, other_section, blanks);

        let Some(pair) = self.registry.get_mut(index) else {
            return;
        };
        let (old_view, old_section, new_section) = match change_side {
            Side::Old => (change_view, change_section, other_section),
            Side::New => (other_view, other_section, change_section),
        };
        let new_view = old_view.other();

        tracing::debug!(
            ?old_section,
            ?new_section,
            "Re-comparing changes"
        );

        let old_lines = read_lines(host, old_view, old_section);
        let new_lines = read_lines(host, new_view, new_section);
        let result = self
            .engine
            .compare(&old_lines, &new_lines, self.config.compare_options());

        let replacement = match result {
            CompareResult::Match => Default::default(),
            CompareResult::Mismatch(report) => {
                apply_markers(host, old_view, old_section.start, &report.old_markers);
                apply_markers(host, new_view, new_section.start, &report.new_markers);
                report.alignment.offset(old_section.start, new_section.start)
            }
        };

        let (old_delta, new_delta) = match change_side {
            Side::Old => (delta, 0),
            Side::New => (0, delta),
        };

        pair.old.ledger.clear();
        pair.new.ledger.clear();

        if pair
            .alignment
            .splice(old_section, old_delta, new_section, new_delta, replacement)
        {
            self.scheduler
                .post(Task::Realign, self.config.timing.realign_delay(), now);
        } else {
            tracing::debug!("alignment splice rejected, scheduling full recompare");
            self.scheduler.post(
                Task::Recompute(RecomputeRequest::full(change_view)),
                self.config.timing.update_delay(),
                now,
            );
        }
    }

    fn settle_activation(&mut self, host: &mut dyn EditorHost, buffer: BufferId, now: Instant) {
        let Some(pair) = self.registry.pair_of(buffer) else {
            return;
        };
        let Some(other) = pair.other(buffer).map(|doc| doc.buffer) else {
            return;
        };

        tracing::debug!(%buffer, "Activate");

        let other_view = host.current_view().other();
        if host.buffer_in_view(other_view) != Some(other) {
            let _guard = self.lock.acquire();
            host.activate(other);
            host.activate(buffer);
        }

        self.compared_file_activated(host, now);
    }

    fn close_closed_pairs(&mut self, host: &mut dyn EditorHost, closed: Vec<BufferId>, now: Instant) {
        let current = host.current_buffer();

        let _guard = self.lock.acquire();

        for buffer in closed.iter().rev() {
            let Some(index) = self.registry.find_by_document(*buffer) else {
                continue;
            };
            let Some(pair) = self.registry.unregister(index) else {
                continue;
            };
            let (Some(closed_doc), Some(other)) = (pair.document(*buffer), pair.other(*buffer))
            else {
                continue;
            };

            if closed_doc.is_temp() {
                if closed_doc.is_open(host) {
                    closed_doc.close(host);
                } else {
                    closed_doc.after_close(host);
                }
            }

            if other.is_temp() {
                if other.is_open(host) {
                    other.close(host);
                } else {
                    other.after_close(host);
                }
            } else if other.is_open(host) {
                other.restore(host);
            }
        }

        if let Some(current) = current.filter(|b| host.view_of(*b).is_some()) {
            host.activate(current);
            self.on_buffer_activated(host, current, now);
        } else if let Some(current) = host.current_buffer() {
            self.on_buffer_activated(host, current, now);
        } else {
            self.set_normal_mode(host);
        }

        let total = host.document_count(ViewId::Main) + host.document_count(ViewId::Sub);
        if total == 1 && host.current_view() == ViewId::Sub {
            if let Some(last) = host.current_buffer() {
                let placeholder = host.new_document();
                host.activate(last);
                host.move_to_other_view();
                host.activate(placeholder);
                host.close(placeholder);
                host.activate(last);
            }
        }
    }
}

fn new_buffer_of(registry: &CompareRegistry, index: usize) -> Option<BufferId> {
    registry.get(index).map(|pair| pair.new.buffer)
}

fn read_lines(host: &dyn EditorHost, view: ViewId, range: LineRange) -> Vec<String> {
    (range.start..range.end())
        .map(|line| host.line_text(view, line))
        .collect()
}

fn apply_markers(host: &mut dyn EditorHost, view: ViewId, start: usize, markers: &[DiffMask]) {
    for (offset, mask) in markers.iter().enumerate() {
        if !mask.is_empty() {
            host.add_markers(view, start + offset, *mask);
        }
    }
}

fn entry_lines(entry: &AlignmentEntry, side: Side) -> (usize, usize) {
    (entry.side(side).line, entry.side(side.opposite()).line)
}

/// `line` 按前一个锚点平移到另一侧的行号；落在差异块内部时为 None
fn counterpart(alignment: &AlignmentInfo, side: Side, line: usize) -> Option<usize> {
    let entries = alignment.entries();
    let split = entries.partition_point(|e| e.side(side).line <= line);
    let (base, other) = match split.checked_sub(1).and_then(|i| entries.get(i)) {
        Some(entry) if !entry.is_anchor() => return None,
        Some(entry) => entry_lines(entry, side),
        None => (0, 0),
    };
    let mapped = other + (line - base);
    match entries.get(split) {
        Some(next) if next.side(side.opposite()).line < mapped => None,
        _ => Some(mapped),
    }
}

/// 在 `(line, other)` 处切开时，每一项都完整落在切点同一侧
fn splits_cleanly(alignment: &AlignmentInfo, side: Side, line: usize, other: usize) -> bool {
    alignment.iter().all(|e| {
        let (c, o) = entry_lines(e, side);
        (c < line) == (o < other)
    })
}

/// 变更侧 `line` 处可以安全切开对齐信息的位置
fn sync_point(alignment: &AlignmentInfo, side: Side, line: usize) -> Option<(usize, usize)> {
    let at_entries = alignment
        .iter()
        .map(|e| entry_lines(e, side))
        .filter(|(c, _)| *c == line)
        .map(|(_, o)| o);
    counterpart(alignment, side, line)
        .into_iter()
        .chain(at_entries)
        .find(|other| splits_cleanly(alignment, side, line, *other))
        .map(|other| (line, other))
}

fn clamp_range(start: usize, len: usize, count: usize) -> LineRange {
    let start = start.min(count);
    LineRange::new(start, len.min(count - start))
}

/// 清除区间内的标记；`blanks` 时连同填充一起清除
fn clear_section(host: &mut dyn EditorHost, view: ViewId, section: LineRange, blanks: bool) {
    if section.start == 0 && section.len >= host.line_count(view) && blanks {
        clear_view(host, view);
        return;
    }
    for line in section.start..section.end() {
        host.clear_markers(view, line);
        if blanks {
            host.set_padding_before(view, line, 0);
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compare/session.rs"]
mod tests;
