// Library interface for the CelesteTalk interaction client
#[macro_use]
pub mod logging;

pub mod api;
pub mod config;
pub mod interaction;
pub mod session;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;
