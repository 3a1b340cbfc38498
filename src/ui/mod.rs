//! UI components for Inkdesk

pub mod activity_bar;
pub mod block_renderer;
pub mod chat;
pub mod editor;
pub mod file_tree;
pub mod live_preview;
pub mod markdown_blocks;
pub mod outline;
pub mod right_panel;
pub mod settings;
pub mod status_bar;
pub mod toolbar;
