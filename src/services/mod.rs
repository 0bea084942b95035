pub mod formatting;
pub mod option_extractor;
pub mod run_extractor;
pub mod section_grouper;
pub mod validator;
pub mod warn_writer;

pub use option_extractor::extract_options;
pub use run_extractor::extract_paragraphs;
pub use section_grouper::group_sections;
pub use validator::{validate, ValidationProblem, ValidationReport};
pub use warn_writer::WarnWriter;
