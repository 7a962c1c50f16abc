use std::fmt;

pub mod config;
pub mod sync;

#[derive(Debug)]
pub struct SpotdlError;

impl fmt::Display for SpotdlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Spotdl error")
    }
}

impl std::error::Error for SpotdlError {}

pub type SpotdlResult<T> = error_stack::Result<T, SpotdlError>;
