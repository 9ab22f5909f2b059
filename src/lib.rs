//! ROA Sim - battle resolution and troop optimization

pub mod battle;
pub mod catalog;
pub mod core;
pub mod optimizer;
