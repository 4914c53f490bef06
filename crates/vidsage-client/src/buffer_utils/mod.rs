mod buffering;

pub use buffering::{BufferError, CircularLineBuffer, DEFAULT_MAX_LINE_LEN};
