//! Formsmith - A terminal drag-and-drop form builder with live preview

pub mod assembler;
pub mod builder;
pub mod canvas;
pub mod catalog;
pub mod config;
pub mod dnd;
pub mod editor;
pub mod models;
pub mod tui;
