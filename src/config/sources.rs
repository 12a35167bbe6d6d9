//! Settings sources layered by the merge service.

pub mod environment;
pub mod settings_file;
