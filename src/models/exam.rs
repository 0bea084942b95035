use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 计分大题信息（`SECTION A. GRAMMAR: 2.0 POINTS`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub letter: String,
    pub name: String,
    /// 分值描述，自由文本
    pub points: String,
}

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    FreeResponse,
    #[default]
    Undetermined,
}

/// 选择题选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    /// A-D
    pub letter: char,
    pub text: String,
    /// 带下划线/加粗标记的渲染结果，仅在选项内容含有这些格式时存在
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_text: Option<String>,
    /// 是否由高亮推断为正确选项
    pub is_correct: bool,
}

/// 题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub number: u32,
    pub text: String,
    pub question_type: QuestionType,
    pub options: Vec<QuestionOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Arc<SectionInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passage: Option<Arc<str>>,
}

impl Question {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            question_type: QuestionType::Undetermined,
            options: Vec::new(),
            correct_answer: None,
            section: None,
            part: None,
            passage: None,
        }
    }

    pub fn has_option(&self, letter: char) -> bool {
        self.options.iter().any(|o| o.letter == letter)
    }

    /// 追加一行题干（换行拼接）
    pub fn append_line(&mut self, line: &str) {
        if self.text.is_empty() {
            self.text = line.to_string();
        } else {
            self.text.push('\n');
            self.text.push_str(line);
        }
    }

    /// 题目结束时确定题型：至少两个选项为选择题，否则为问答题
    pub fn resolve_type(&mut self) {
        if self.question_type == QuestionType::Undetermined {
            self.question_type = if self.options.len() >= 2 {
                QuestionType::MultipleChoice
            } else {
                QuestionType::FreeResponse
            };
        }
    }

    /// 高亮推断出的正确选项
    pub fn inferred_correct(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    pub fn is_multiple_choice(&self) -> bool {
        self.question_type == QuestionType::MultipleChoice
    }
}

/// 按大题分组后的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<String>,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passage: Option<Arc<str>>,
}

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamData {
    pub title: String,
    /// 考试时长（分钟）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    pub questions: Vec<Question>,
    pub sections: Vec<Section>,
    /// 题号 -> 正确答案
    pub answers: BTreeMap<u32, String>,
}

impl ExamData {
    pub fn question(&self, number: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == number)
    }
}
