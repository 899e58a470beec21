//! 预设答案的提示实现：记录所有通知与询问，按队列回答
//!
//! 测试与命令行程序使用；真实宿主应弹出对话框。

use std::collections::VecDeque;

use crate::kernel::services::ports::{Notice, Question, UserPrompt};

#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    default_answer: bool,
    notices: Vec<Notice>,
    questions: Vec<Question>,
}

impl ScriptedPrompt {
    pub fn new(default_answer: bool) -> Self {
        Self {
            default_answer,
            ..Default::default()
        }
    }

    pub fn with_answers(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn prompt_count(&self) -> usize {
        self.notices.len() + self.questions.len()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn notify(&mut self, notice: &Notice) {
        tracing::info!(%notice, "notice");
        self.notices.push(notice.clone());
    }

    fn confirm(&mut self, question: &Question) -> bool {
        let answer = self.answers.pop_front().unwrap_or(self.default_answer);
        tracing::info!(%question, answer, "question");
        self.questions.push(question.clone());
        answer
    }
}
