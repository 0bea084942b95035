pub mod exam;
pub mod run;

pub use exam::{ExamData, Question, QuestionOption, QuestionType, Section, SectionInfo};
pub use run::{Paragraph, Run};
