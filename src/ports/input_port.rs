//! Input reading port: one reader per [`InputFormat`].

use crate::domain::error::PerfscopeError;
use crate::domain::input::{InputFormat, RawInput};

pub trait InputReader {
    fn format(&self) -> InputFormat;

    fn read(&self, bytes: &[u8]) -> Result<RawInput, PerfscopeError>;
}
