pub mod dialogs;
pub mod render;
pub mod window;
