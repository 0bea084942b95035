//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统中唯一读写文件系统的地方。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文档处理器
//! - 扫描输入目录（Vec<PathBuf>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `document_processor` - 单个文档处理器
//! - 解析 → 校验 → 写 JSON / warn.txt
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PathBuf>)
//!     ↓
//! document_processor (处理单个 .docx)
//!     ↓
//! workflow::exam_flow (解析单个文档)
//!     ↓
//! services (能力层：run / option / grouper / validator)
//!     ↓
//! infrastructure (基础设施：archive_reader)
//! ```

pub mod batch_processor;
pub mod document_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use document_processor::{process_document, DocumentOutcome};
