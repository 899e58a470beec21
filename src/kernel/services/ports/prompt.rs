//! 用户提示契约：通知（只需确认）与询问（是/否）

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    AlreadyCompared { name: String },
    OnlyOneDocument,
    NoSelection,
    NotOnDisk,
    SnapshotFailed,
    FilesMatch {
        old: String,
        new: String,
        selection: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Question {
    EncodingMismatch,
    CloseMatchedFiles {
        old: String,
        new: String,
        selection: bool,
    },
}

fn subject(selection: bool) -> &'static str {
    if selection {
        "Selected lines in files"
    } else {
        "Files"
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AlreadyCompared { name } => {
                write!(f, "File \"{}\" is already compared - operation ignored.", name)
            }
            Notice::OnlyOneDocument => write!(f, "Only one file opened - operation ignored."),
            Notice::NoSelection => write!(f, "No selected lines to compare - operation ignored."),
            Notice::NotOnDisk => write!(f, "File is not written to disk - operation ignored."),
            Notice::SnapshotFailed => write!(f, "Creating temp file failed - operation aborted."),
            Notice::FilesMatch { old, new, selection } => {
                write!(f, "{} \"{}\" and \"{}\" match.", subject(*selection), new, old)
            }
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Question::EncodingMismatch => write!(
                f,
                "Trying to compare files with different encodings - \n\
                 the result might be inaccurate and misleading.\n\nCompare anyway?"
            ),
            Question::CloseMatchedFiles { old, new, selection } => write!(
                f,
                "{} \"{}\" and \"{}\" match.\n\nClose compared files?",
                subject(*selection),
                new,
                old
            ),
        }
    }
}

pub trait UserPrompt {
    fn notify(&mut self, notice: &Notice);
    fn confirm(&mut self, question: &Question) -> bool;
}
