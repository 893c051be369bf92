//! Byte-level decoding: charset detection and the code-point pull decoder.
//!
//! The decoder never hands raw bytes to the tokenizer. It yields Unicode
//! scalar values with line endings normalized to `\n` and C0 controls other
//! than TAB, LF and ESC removed.

mod byte_decoder;
mod detect;
mod encoding;
mod source;
mod tables;
mod utf8;

pub use byte_decoder::{ByteDecoder, Iso2022State};
pub use detect::{
    declared_encoding, detect_bytes, detect_encoding, detect_in_window, has_leading_tag,
    probe_ascii, probe_declared, probe_utf8,
};
pub use encoding::Encoding;
pub use source::ByteSource;
