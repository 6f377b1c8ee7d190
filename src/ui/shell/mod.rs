pub mod app;
pub mod prompt;
pub mod view;

pub use app::run;
