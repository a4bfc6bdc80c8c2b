//! Newline-delimited framing shared by the broker and its clients.
//!
//! TCP gives no message boundaries: several small envelopes may arrive in one
//! read and one envelope may be split across reads. Both sides therefore go
//! through [`LinesCodec`], which buffers until `\n` and rejects lines longer
//! than the configured maximum.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

pub use tokio_util::codec::LinesCodecError;

/// Default maximum length of one line (64 KiB).
pub const DEFAULT_MAX_FRAME: usize = 64 * 1024;

/// Stream of decoded lines (`futures_util::StreamExt::next`).
pub type LineReader<R> = FramedRead<R, LinesCodec>;

/// Sink of lines; each `send` appends `\n` and flushes.
pub type LineWriter<W> = FramedWrite<W, LinesCodec>;

pub fn line_reader<R: AsyncRead>(inner: R, max_frame: usize) -> LineReader<R> {
    FramedRead::new(inner, LinesCodec::new_with_max_length(max_frame))
}

pub fn line_writer<W: AsyncWrite>(inner: W, max_frame: usize) -> LineWriter<W> {
    FramedWrite::new(inner, LinesCodec::new_with_max_length(max_frame))
}
