// Terminal front end for the homicide report dashboard

pub mod app;
pub mod cli;
pub mod config;
pub mod cube;
pub mod event;
pub mod logging;
pub mod terminal;
pub mod ui;
