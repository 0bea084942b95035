//! 解析上下文
//!
//! 封装"当前在哪个大题、哪个小题说明、哪段阅读材料、哪道题"这一信息。
//! 每次解析各自持有一个上下文，不存在跨文档共享的状态。

use crate::models::{Paragraph, Question, QuestionType, SectionInfo};
use crate::services::option_extractor::{extract_options, first_marker_start};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

static TIME_LIMIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)thời\s*gian.*?(\d+)\s*phút").expect("time limit regex")
});

/// 解析上下文
#[derive(Debug, Default)]
pub struct ParseCtx {
    pub current_section: Option<Arc<SectionInfo>>,
    pub current_part: Option<String>,
    pub current_question: Option<Question>,
    pub reading_passage: Option<String>,
    pub in_reading_passage: bool,

    /// 当前阅读材料的共享副本，材料文本变化时失效
    shared_passage: Option<Arc<str>>,
    /// 已完成的题目（按出现顺序）
    finished: Vec<Question>,
    seen_numbers: HashSet<u32>,

    title: Option<String>,
    time_limit: Option<u32>,
    /// 是否已经遇到过大题、小题说明、阅读材料或题目
    structure_seen: bool,
}

/// 上下文收尾后的产物
#[derive(Debug)]
pub struct ParseOutcome {
    pub title: Option<String>,
    pub time_limit: Option<u32>,
    /// 已按题号稳定排序
    pub questions: Vec<Question>,
    pub answers: BTreeMap<u32, String>,
}

impl ParseCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// 大题标题：切换大题，同时结束上一段阅读材料和小题说明
    pub fn on_section(&mut self, info: SectionInfo) {
        debug!("进入大题 {}: {}", info.letter, info.name);
        self.current_section = Some(Arc::new(info));
        self.current_part = None;
        self.clear_passage();
        self.structure_seen = true;
    }

    /// 小题说明
    pub fn on_part(&mut self, line: &str) {
        debug!("进入小题: {}", line);
        self.current_part = Some(line.to_string());
        self.clear_passage();
        self.structure_seen = true;
    }

    /// 阅读材料标题：重新开始累积材料
    pub fn on_passage_start(&mut self, line: &str) {
        self.reading_passage = Some(line.to_string());
        self.shared_passage = None;
        self.in_reading_passage = true;
        self.structure_seen = true;
    }

    /// 阅读材料正文
    pub fn on_passage_line(&mut self, line: &str) {
        match self.reading_passage.as_mut() {
            Some(passage) => {
                passage.push('\n');
                passage.push_str(line);
            }
            None => self.reading_passage = Some(line.to_string()),
        }
        self.shared_passage = None;
    }

    /// 新题开始：结束上一题，创建新题并提取同一行中的选项
    pub fn start_question(&mut self, number: u32, rest: &str, paragraph: &Paragraph) {
        self.finish_current();
        self.in_reading_passage = false;
        self.structure_seen = true;

        // 行内选项不计入题干
        let stem = match first_marker_start(rest) {
            Some(idx) => rest[..idx].trim(),
            None => rest,
        };

        let mut question = Question::new(number, stem);
        question.section = self.current_section.clone();
        question.part = self.current_part.clone();
        question.passage = self.passage_handle();

        extract_options(paragraph, &mut question);
        self.current_question = Some(question);
    }

    /// 选项行
    pub fn on_option_line(&mut self, paragraph: &Paragraph) {
        if let Some(question) = self.current_question.as_mut() {
            extract_options(paragraph, question);
        }
    }

    /// `Đáp án:` 行
    ///
    /// 非选择题：记录答案并定为问答题。
    /// 选择题：题型不变，只有当值是已有选项字母时才作为备用答案（高亮优先）。
    pub fn on_answer_line(&mut self, value: &str) {
        let Some(question) = self.current_question.as_mut() else {
            return;
        };

        if question.is_multiple_choice() {
            let letter = value.trim().trim_end_matches(['.', ')']).to_uppercase();
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if question.has_option(c) => {
                    question.correct_answer = Some(c.to_string());
                }
                _ => debug!("Câu {}: 选择题忽略答案行 '{}'", question.number, value),
            }
            return;
        }

        question.correct_answer = Some(value.to_string());
        question.question_type = QuestionType::FreeResponse;
    }

    /// 续行：并入当前题干
    pub fn on_continuation(&mut self, line: &str) {
        if let Some(question) = self.current_question.as_mut() {
            question.append_line(line);
        }
    }

    /// 不属于任何题目的行；在正文开始之前用作试卷标题和考试时长
    pub fn on_unclassified(&mut self, line: &str) {
        if self.structure_seen {
            debug!("丢弃行: {}", line);
            return;
        }
        if let Some(caps) = TIME_LIMIT_RE.captures(line) {
            if let Ok(minutes) = caps[1].parse() {
                self.time_limit = Some(minutes);
                return;
            }
        }
        if self.title.is_none() {
            self.title = Some(line.to_string());
        }
    }

    /// 结束解析：收尾最后一题，按高亮确定选择题答案，按题号排序
    pub fn finish(mut self) -> ParseOutcome {
        self.finish_current();

        let mut questions = std::mem::take(&mut self.finished);
        for question in questions.iter_mut().filter(|q| q.is_multiple_choice()) {
            if let Some(letter) = question.inferred_correct().map(|o| o.letter) {
                question.correct_answer = Some(letter.to_string());
            }
        }
        questions.sort_by_key(|q| q.number);

        let answers = questions
            .iter()
            .filter_map(|q| q.correct_answer.clone().map(|a| (q.number, a)))
            .collect();

        ParseOutcome {
            title: self.title,
            time_limit: self.time_limit,
            questions,
            answers,
        }
    }

    fn finish_current(&mut self) {
        if let Some(mut question) = self.current_question.take() {
            question.resolve_type();
            if !self.seen_numbers.insert(question.number) {
                warn!("⚠️ 题号重复: Câu {}", question.number);
            }
            self.finished.push(question);
        }
    }

    fn clear_passage(&mut self) {
        self.reading_passage = None;
        self.shared_passage = None;
        self.in_reading_passage = false;
    }

    /// 当前材料的共享句柄，同一段材料下的题目共用一个 Arc
    fn passage_handle(&mut self) -> Option<Arc<str>> {
        if self.shared_passage.is_none() {
            self.shared_passage = self.reading_passage.as_deref().map(Arc::from);
        }
        self.shared_passage.clone()
    }
}
