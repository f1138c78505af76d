//! Library surface of the sockwatch dashboard, shared by the binary and its tests.

pub mod app;
pub mod bus;
pub mod cli;
pub mod derive;
pub mod history;
pub mod logging;
pub mod pages;
pub mod profiles;
pub mod proclist;
pub mod protocol;
pub mod subscription;
pub mod types;
pub mod ui;
pub mod ws;
