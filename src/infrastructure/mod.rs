pub mod archive_reader;

pub use archive_reader::{load_document_xml, read_document_xml, DOCUMENT_ENTRY};
