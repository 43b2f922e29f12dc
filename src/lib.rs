pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod logging;
pub mod shortcuts;
pub mod slash;
pub mod suggestion;

#[cfg(test)]
pub mod test_helpers;
