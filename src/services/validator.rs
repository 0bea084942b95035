//! 试卷校验服务
//!
//! 检查解析结果的结构完整性。问题不是致命错误，由调用方决定是否拦截。

use crate::models::ExamData;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 单个校验问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationProblem {
    /// 既没有题干也没有选项
    EmptyQuestion { number: u32 },
    /// 选择题没有任何选项
    NoOptions { number: u32 },
    /// 没有确定正确答案
    MissingAnswer { number: u32 },
    /// 题号重复
    DuplicateNumber { number: u32, count: usize },
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationProblem::EmptyQuestion { number } => {
                write!(f, "Câu {}: 没有题干也没有选项", number)
            }
            ValidationProblem::NoOptions { number } => {
                write!(f, "Câu {}: 选择题没有选项", number)
            }
            ValidationProblem::MissingAnswer { number } => {
                write!(f, "Câu {}: 缺少正确答案", number)
            }
            ValidationProblem::DuplicateNumber { number, count } => {
                write!(f, "Câu {}: 题号重复出现 {} 次", number, count)
            }
        }
    }
}

/// 校验结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub problems: Vec<ValidationProblem>,
}

/// 校验解析结果
pub fn validate(exam: &ExamData) -> ValidationReport {
    let mut problems = Vec::new();

    for question in &exam.questions {
        if question.text.trim().is_empty() && question.options.is_empty() {
            problems.push(ValidationProblem::EmptyQuestion {
                number: question.number,
            });
        }
        if question.is_multiple_choice() && question.options.is_empty() {
            problems.push(ValidationProblem::NoOptions {
                number: question.number,
            });
        }
        if question.correct_answer.is_none() {
            problems.push(ValidationProblem::MissingAnswer {
                number: question.number,
            });
        }
    }

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for question in &exam.questions {
        *counts.entry(question.number).or_default() += 1;
    }
    problems.extend(
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(number, count)| ValidationProblem::DuplicateNumber { number, count }),
    );

    ValidationReport {
        valid: problems.is_empty(),
        problems,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, QuestionType};

    fn exam(questions: Vec<Question>) -> ExamData {
        ExamData {
            title: "test".into(),
            time_limit: None,
            questions,
            sections: Vec::new(),
            answers: BTreeMap::new(),
        }
    }

    fn answered(number: u32) -> Question {
        let mut q = Question::new(number, "stem");
        q.question_type = QuestionType::FreeResponse;
        q.correct_answer = Some("x".into());
        q
    }

    #[test]
    fn test_complete_exam_is_valid() {
        let report = validate(&exam(vec![answered(1), answered(2)]));
        assert!(report.valid);
        assert!(report.problems.is_empty());
    }

    #[test]
    fn test_reports_each_problem_kind() {
        let empty = Question::new(1, "");
        let mut no_options = Question::new(2, "stem");
        no_options.question_type = QuestionType::MultipleChoice;
        no_options.correct_answer = Some("A".into());

        let report = validate(&exam(vec![empty, no_options, answered(3), answered(3)]));

        assert!(!report.valid);
        assert_eq!(
            report.problems,
            vec![
                ValidationProblem::EmptyQuestion { number: 1 },
                ValidationProblem::MissingAnswer { number: 1 },
                ValidationProblem::NoOptions { number: 2 },
                ValidationProblem::DuplicateNumber {
                    number: 3,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_does_not_mutate_input() {
        let data = exam(vec![Question::new(1, "")]);
        let before = data.clone();
        let _ = validate(&data);
        assert_eq!(data, before);
    }
}
