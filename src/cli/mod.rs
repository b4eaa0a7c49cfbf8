pub mod allocate;
pub mod compare;
pub mod export;
pub mod health;
pub mod project;
pub mod setup;
pub mod summary;
pub mod ui;
