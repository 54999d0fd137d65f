//! Content digests computed while data streams through

use base64::{Engine as _, engine::general_purpose};
use md5::{Digest, Md5};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Encode a digest the way object stores report `Content-MD5`
pub fn encode_digest(digest: &[u8]) -> String {
    general_purpose::STANDARD.encode(digest)
}

/// MD5 of a complete buffer, base64 encoded
pub fn md5_base64(data: &[u8]) -> String {
    encode_digest(&Md5::digest(data))
}

pin_project! {
    /// An `AsyncRead` adapter that hashes every byte it yields
    pub struct Md5Reader<R> {
        #[pin]
        inner: R,
        hasher: Md5,
        bytes_read: u64,
    }
}

impl<R: AsyncRead> Md5Reader<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Md5::new(),
            bytes_read: 0,
        }
    }

    /// Number of bytes yielded so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Consume the reader and return the base64 digest of what it yielded
    pub fn finish(self) -> String {
        encode_digest(&self.hasher.finalize())
    }
}

impl<R: AsyncRead> AsyncRead for Md5Reader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.project();
        let before = buf.filled().len();
        let poll = this.inner.poll_read(cx, buf);

        if let Poll::Ready(Ok(())) = &poll {
            let fresh = &buf.filled()[before..];
            if !fresh.is_empty() {
                this.hasher.update(fresh);
                *this.bytes_read += fresh.len() as u64;
            }
        }

        poll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_md5_base64_known_value() {
        assert_eq!(md5_base64(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }

    #[tokio::test]
    async fn test_reader_hashes_everything_it_yields() {
        let data = b"hello filegate".repeat(1000);
        let mut reader = Md5Reader::new(&data[..]);

        let mut sink = Vec::new();
        reader.read_to_end(&mut sink).await.unwrap();

        assert_eq!(sink, data);
        assert_eq!(reader.bytes_read(), data.len() as u64);
        assert_eq!(reader.finish(), md5_base64(&data));
    }

    #[tokio::test]
    async fn test_reader_hashes_across_small_reads() {
        let data = b"0123456789abcdef".repeat(64);
        let mut reader = Md5Reader::new(&data[..]);

        let mut chunk = [0u8; 7];
        let mut total = 0;
        loop {
            let n = reader.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            total += n;
        }

        assert_eq!(total, data.len());
        assert_eq!(reader.finish(), md5_base64(&data));
    }

    #[tokio::test]
    async fn test_unread_reader_has_empty_digest() {
        let reader = Md5Reader::new(&b"never read"[..]);
        assert_eq!(reader.bytes_read(), 0);
        assert_eq!(reader.finish(), md5_base64(b""));
    }
}
