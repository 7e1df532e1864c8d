//! Reusable rendering helpers shared by screens.

pub mod badge;
pub mod filter_bar;
