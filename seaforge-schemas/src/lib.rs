pub mod environment;
pub mod file_formats;
pub mod growth;
pub mod parameter;
pub mod region;
pub mod time;
