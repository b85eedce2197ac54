pub mod app;
pub mod history_view;
pub mod record_view;
pub mod trends_view;
pub mod widgets;
