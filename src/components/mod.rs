pub mod help;
pub mod plot;
pub mod status_bar;
pub mod tree;
