pub mod author_index;
pub mod author_parser;
pub mod filename;
pub mod pdf_store;
pub mod record_extractor;
pub mod skip_writer;
pub mod tex_builder;

pub use author_index::{build_author_index, AuthorIndexEntry, AuthorRef};
pub use record_extractor::extract_records;
pub use skip_writer::SkipWriter;
pub use tex_builder::{latex_escape, write_tex, TexBuilder};
