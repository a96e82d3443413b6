pub mod clicker;
pub mod config;
pub mod countdown;
pub mod door;
pub mod include;
