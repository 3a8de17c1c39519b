pub mod debug_bar;
pub mod session;
