//! Post generation: the title/post dialog and the clipboard it copies to.

pub mod clipboard;
pub mod dialog;

pub use clipboard::{Clipboard, CommandClipboard, MemoryClipboard, NoClipboard};
pub use dialog::{
    COPIED_INDICATOR, DialogPhase, DialogState, EXAMPLE_TITLES, GenerateCallback, GeneratedPost,
    GenerationDialog, PostLine, format_post,
};
