//! UI module root: exposes drawing functions for individual tabs.

pub mod cpu;
pub mod disk;
pub mod header;
pub mod home;
pub mod mem;
pub mod net;
pub mod processes;
pub mod theme;
pub mod util;
