//! 行分类
//!
//! 每个匹配器是一个独立的纯函数；`classify` 按固定优先级依次尝试，
//! 第一个命中的匹配器决定这一行的角色。

use crate::models::SectionInfo;
use once_cell::sync::Lazy;
use phf::phf_set;
use regex::Regex;

static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^SECTION\s+([A-Z])\s*[.:]\s*(.+?)\s*:\s*(.+)$").expect("section regex")
});

static PART_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[IVX]+\.\s*\S").expect("part regex"));

/// 阅读材料标题：只认这两种写法
static PASSAGE_RES: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)^read\s+the\s+(?:following\s+)?(?:passage|text)\b").expect("passage regex"),
        Regex::new(r"(?i)^(?:reading\s+passage|passage\s*\d+)\b").expect("passage regex"),
    ]
});

static QUESTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^Câu\s+(\d+)\s*[.:]\s*(.*)$").expect("question regex"));

static OPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?[A-D][.)]").expect("option regex"));

static ANSWER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Đáp\s*án\s*:\s*(\S.*)$").expect("answer regex"));

/// 罗马数字开头的行只有包含这些指令词时才算小题说明
static PART_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "circle",
    "read",
    "complete",
    "rewrite",
    "put",
    "choose",
    "give",
    "write",
    "match",
    "fill",
    "find",
    "mark",
};

/// 一行文本的结构角色
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `SECTION A. GRAMMAR: 2.0 POINTS`
    SectionHeader(SectionInfo),
    /// `II. Put the verbs in brackets ...`
    PartHeader,
    /// 阅读材料标题
    PassageStart,
    /// 阅读材料正文
    PassageLine,
    /// `Câu 5. ...`
    QuestionStart { number: u32, rest: &'a str },
    /// `A. ...` / `B) ...`
    OptionLine,
    /// `Đáp án: ...`
    AnswerLine(&'a str),
    /// 当前题目的续行
    Continuation,
    /// 不属于任何题目的行
    Unclassified,
}

pub fn match_section(line: &str) -> Option<SectionInfo> {
    let caps = SECTION_RE.captures(line)?;
    Some(SectionInfo {
        letter: caps[1].to_uppercase(),
        name: caps[2].trim().to_string(),
        points: caps[3].trim().to_string(),
    })
}

pub fn match_part(line: &str) -> bool {
    if !PART_RE.is_match(line) {
        return false;
    }
    let lower = line.to_lowercase();
    PART_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

pub fn match_passage_start(line: &str) -> bool {
    PASSAGE_RES.iter().any(|re| re.is_match(line))
}

pub fn match_question(line: &str) -> Option<(u32, &str)> {
    let caps = QUESTION_RE.captures(line)?;
    let number = caps[1].parse().ok()?;
    let rest = caps.get(2).map_or("", |m| m.as_str().trim());
    Some((number, rest))
}

pub fn match_option(line: &str) -> bool {
    OPTION_RE.is_match(line)
}

pub fn match_answer(line: &str) -> Option<&str> {
    ANSWER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// 按优先级给一行（已去除首尾空白）分类
///
/// # 参数
/// - `line`: 非空行
/// - `in_reading_passage`: 当前是否处于阅读材料中
/// - `has_question`: 是否有正在构建的题目
pub fn classify(line: &str, in_reading_passage: bool, has_question: bool) -> LineKind<'_> {
    if let Some(info) = match_section(line) {
        return LineKind::SectionHeader(info);
    }
    if match_part(line) {
        return LineKind::PartHeader;
    }
    if match_passage_start(line) {
        return LineKind::PassageStart;
    }

    let question = match_question(line);
    if in_reading_passage && question.is_none() {
        return LineKind::PassageLine;
    }
    if let Some((number, rest)) = question {
        return LineKind::QuestionStart { number, rest };
    }

    if !has_question {
        return LineKind::Unclassified;
    }
    if match_option(line) {
        return LineKind::OptionLine;
    }
    if let Some(value) = match_answer(line) {
        return LineKind::AnswerLine(value);
    }
    LineKind::Continuation
}
