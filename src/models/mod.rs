//! 数据模型层

pub mod alignment;
pub mod diff_mask;
pub mod ids;

pub use alignment::{AlignmentEntry, AlignmentInfo, AlignmentSide};
pub use diff_mask::DiffMask;
pub use ids::{BufferId, DocSlot, EditAction, LineRange, Side, TempKind, VcsKind, ViewId};
