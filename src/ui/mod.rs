pub mod app;
pub mod chat;
pub mod controls;
pub mod dashboard;
pub mod history;
pub mod info;
pub mod settings;
