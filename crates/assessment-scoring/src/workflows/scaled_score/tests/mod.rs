mod common;
mod editor;
mod session;
