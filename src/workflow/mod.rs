pub mod exam_flow;
pub mod line_classifier;
pub mod parse_ctx;

pub use exam_flow::{parse_document_xml, parse_exam_bytes, parse_exam_file, parse_paragraphs, ParseOptions};
pub use line_classifier::{classify, LineKind};
pub use parse_ctx::ParseCtx;
