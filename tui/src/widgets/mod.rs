//! Widgets drawn into compositor layers

pub mod card;
pub mod compose;
pub mod status;
pub mod text_block;

pub use card::CardWidget;
pub use compose::{ComposeError, ComposeField, ComposeForm, ComposeView};
pub use status::{Notice, NoticeLevel, StatusLine};
pub use text_block::TextBlock;
