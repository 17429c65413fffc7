mod ocr;
pub use ocr::*;

mod upload;
pub use upload::*;

mod normalize;
pub use normalize::*;

mod docx;
pub use docx::*;

mod store;
pub use store::*;
