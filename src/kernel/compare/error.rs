use std::fmt;

use crate::kernel::services::ports::Notice;

/// 比较命令的前置条件失败
///
/// 出错时注册表与暂存状态保持调用前的样子，用户已通过提示端口得到通知。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    AlreadyCompared { name: String },
    OnlyOneDocument,
    NoSelection,
    EncodingMismatchDeclined,
    NotOnDisk,
    SnapshotFailed,
    NotCompared,
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareError::AlreadyCompared { name } => {
                write!(f, "document {} is already compared", name)
            }
            CompareError::OnlyOneDocument => write!(f, "only one document is open"),
            CompareError::NoSelection => write!(f, "no selected lines to compare"),
            CompareError::EncodingMismatchDeclined => {
                write!(f, "compare of documents with different encodings declined")
            }
            CompareError::NotOnDisk => write!(f, "document is not written to disk"),
            CompareError::SnapshotFailed => write!(f, "creating snapshot document failed"),
            CompareError::NotCompared => write!(f, "document is not part of a compare"),
        }
    }
}

impl std::error::Error for CompareError {}

impl CompareError {
    /// 需要展示给用户的提示；用户主动拒绝的情况不再提示
    pub fn notice(&self) -> Option<Notice> {
        match self {
            CompareError::AlreadyCompared { name } => {
                Some(Notice::AlreadyCompared { name: name.clone() })
            }
            CompareError::OnlyOneDocument => Some(Notice::OnlyOneDocument),
            CompareError::NoSelection => Some(Notice::NoSelection),
            CompareError::NotOnDisk => Some(Notice::NotOnDisk),
            CompareError::SnapshotFailed => Some(Notice::SnapshotFailed),
            CompareError::EncodingMismatchDeclined | CompareError::NotCompared => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompareError>;
