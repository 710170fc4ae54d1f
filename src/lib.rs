pub mod config;
pub mod debugger;
pub mod ir;
pub mod logging;
pub mod parsers;
