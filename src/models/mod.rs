pub mod loaders;
pub mod record;

pub use loaders::{MemorySheet, SheetSource, XlsxSheet};
pub use record::{AbstractRecord, PdfSource, ResolvedRecord};
