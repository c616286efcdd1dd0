pub mod chord;
pub mod flows;
pub mod popup;
