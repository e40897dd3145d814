//! Text content, editing state and the text layout collaborator.

pub mod buffer;
pub mod layout;

pub use buffer::TextBuffer;
pub use layout::{MonospaceLayouter, TextLayout, TextLayouter, TextLine};
