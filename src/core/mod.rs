//! Workspace state: library tree, tabs, outline, chat and configuration

pub mod chat;
pub mod config;
pub mod document;
pub mod outline;
pub mod seed;
pub mod tabs;
pub mod tree;
pub mod workspace;
