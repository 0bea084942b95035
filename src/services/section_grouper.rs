//! 大题分组服务
//!
//! 解析完成后，把排好序的题目按所属大题归组

use crate::models::{Question, Section};
use std::collections::HashMap;

/// 没有大题信息时使用的分组名称
pub const DEFAULT_SECTION_NAME: &str = "Questions";

/// 分组键：大题字母 + 名称；没有大题信息的题目共用一个默认键
fn section_key(question: &Question) -> Option<(String, String)> {
    question
        .section
        .as_ref()
        .map(|s| (s.letter.clone(), s.name.clone()))
}

/// 按大题归组，分组顺序为首次出现的顺序
///
/// 每个分组的描述、分值、阅读材料取自组内第一道题
pub fn group_sections(questions: &[Question]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut index_by_key: HashMap<Option<(String, String)>, usize> = HashMap::new();

    for question in questions {
        let key = section_key(question);
        match index_by_key.get(&key) {
            Some(&idx) => sections[idx].questions.push(question.clone()),
            None => {
                let name = match &question.section {
                    Some(info) => format!("SECTION {}. {}", info.letter, info.name),
                    None => DEFAULT_SECTION_NAME.to_string(),
                };
                index_by_key.insert(key, sections.len());
                sections.push(Section {
                    name,
                    description: question.part.clone(),
                    points: question.section.as_ref().map(|s| s.points.clone()),
                    questions: vec![question.clone()],
                    passage: question.passage.clone(),
                });
            }
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionInfo;
    use std::sync::Arc;

    fn question(number: u32, section: Option<&Arc<SectionInfo>>, part: Option<&str>) -> Question {
        let mut q = Question::new(number, format!("q{}", number));
        q.section = section.cloned();
        q.part = part.map(str::to_string);
        q
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let a = Arc::new(SectionInfo {
            letter: "A".into(),
            name: "GRAMMAR".into(),
            points: "2.0 POINTS".into(),
        });
        let b = Arc::new(SectionInfo {
            letter: "B".into(),
            name: "READING".into(),
            points: "3.0 POINTS".into(),
        });

        let questions = vec![
            question(1, None, None),
            question(2, Some(&a), Some("I. Circle the correct answer.")),
            question(3, Some(&a), Some("II. Put the verbs in brackets.")),
            question(4, Some(&b), None),
        ];
        let sections = group_sections(&questions);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].name, DEFAULT_SECTION_NAME);
        assert_eq!(sections[0].points, None);
        assert_eq!(sections[1].name, "SECTION A. GRAMMAR");
        assert_eq!(sections[1].points.as_deref(), Some("2.0 POINTS"));
        assert_eq!(
            sections[1].description.as_deref(),
            Some("I. Circle the correct answer.")
        );
        assert_eq!(sections[1].questions.len(), 2);
        assert_eq!(sections[2].questions[0].number, 4);
    }

    #[test]
    fn test_passage_comes_from_first_question() {
        let passage: Arc<str> = Arc::from("Read the passage.\nOnce upon a time.");
        let mut q1 = question(1, None, None);
        q1.passage = Some(passage.clone());
        let mut q2 = question(2, None, None);
        q2.passage = Some(passage.clone());

        let sections = group_sections(&[q1, q2]);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].passage.as_deref(), Some(&*passage));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_sections(&[]).is_empty());
    }
}
