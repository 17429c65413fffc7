pub mod documents;
pub mod index;
pub mod ocr;

pub use documents::*;
pub use index::*;
pub use ocr::*;
