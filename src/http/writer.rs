use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, Response};

/// Writes one response to a client.
///
/// Buffered bodies go out together with the head as a single write. File
/// bodies are streamed in `chunk_size` pieces after the head; a failed write
/// aborts the transfer and is reported to the caller, never retried.
pub struct ResponseWriter {
    response: Response,
    chunk_size: usize,
    written: u64,
}

impl ResponseWriter {
    pub fn new(response: Response, chunk_size: usize) -> Self {
        Self {
            response,
            chunk_size: chunk_size.max(1),
            written: 0,
        }
    }

    /// Body bytes sent so far.
    pub fn body_bytes_written(&self) -> u64 {
        self.written
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let head = self.response.head();
        let head_only = self.response.head_only;

        match &mut self.response.body {
            Body::Bytes(bytes) => {
                let mut buf = head;
                if !head_only {
                    buf.extend_from_slice(bytes);
                }
                stream.write_all(&buf).await?;
                if !head_only {
                    self.written = bytes.len() as u64;
                }
            }
            Body::File { file, len, .. } => {
                stream.write_all(&head).await?;
                if !head_only {
                    let mut limited = file.take(*len);
                    copy_chunked(&mut limited, stream, self.chunk_size, &mut self.written).await?;
                }
            }
        }

        stream.flush().await?;
        Ok(())
    }

    /// Consumes the writer, dropping the response (and any temp file it owns).
    pub fn finish(self) -> u64 {
        self.written
    }
}

/// Copies `reader` to `writer`. `total` counts every chunk fully written,
/// so it stays accurate when a later write fails.
async fn copy_chunked<R, W>(
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
    total: &mut u64,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; chunk_size];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        writer.write_all(&buf[..n]).await?;
        *total += n as u64;
    }
}
