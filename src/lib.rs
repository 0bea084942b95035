//! # Exam Docx Extract
//!
//! 从 Word (.docx) 试卷中还原结构化试卷：大题、小题说明、阅读材料、题目、选项和答案。
//! 选择题答案不是写在文档里的，而是通过选项上的高亮推断出来的。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 读取压缩包，取出 `word/document.xml`
//!
//! ### ② 业务能力层（Services）
//! - `run_extractor` - XML → 段落 / Run（偏移 + 高亮/下划线/加粗）
//! - `option_extractor` - 选项切分、高亮推断正确答案
//! - `formatting` - 选项的格式化渲染
//! - `section_grouper` - 按大题分组
//! - `validator` - 结构完整性校验
//! - `warn_writer` - 写 warn.txt
//!
//! ### ③ 流程层（Workflow）
//! - `line_classifier` - 行角色分类（按优先级）
//! - `parse_ctx` - 解析上下文（当前大题/小题/材料/题目）
//! - `exam_flow` - 一份文档的完整解析流程
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量解析，管理并发
//! - `orchestrator/document_processor` - 单个文档：解析 → 校验 → 输出

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ExtractError, ExtractResult};
pub use models::{ExamData, Paragraph, Question, QuestionOption, QuestionType, Run, Section, SectionInfo};
pub use orchestrator::App;
pub use services::{validate, ValidationProblem, ValidationReport};
pub use workflow::{parse_document_xml, parse_exam_bytes, parse_exam_file, parse_paragraphs, ParseOptions};
