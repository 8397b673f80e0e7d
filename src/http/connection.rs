use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::handler::Dispatcher;
use crate::http::parser::has_request_line;
use crate::http::writer::ResponseWriter;

/// Upper bound on how much of a request is buffered before dispatching.
/// Only the request line matters; headers beyond this are never read.
pub const MAX_REQUEST_SIZE: usize = 8192;

/// Owns one accepted connection for exactly one request/response exchange.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    dispatcher: Arc<Dispatcher>,
    id: u64,
}

pub enum ConnectionState {
    Reading,
    Processing,
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, dispatcher: Arc<Dispatcher>, id: u64) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(1024),
            state: ConnectionState::Reading,
            dispatcher,
            id,
        }
    }

    /// Reads one request, writes one response, then stops. HTTP/1.0: the
    /// caller closes the stream by dropping the connection.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    if self.read_request().await? {
                        self.state = ConnectionState::Processing;
                    } else {
                        tracing::debug!(conn = self.id, "Client closed before sending a request");
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Processing => {
                    let response = self.dispatcher.dispatch(&self.buffer, self.id).await;
                    tracing::info!(
                        conn = self.id,
                        request = %first_line(&self.buffer),
                        status = response.status.as_u16(),
                        length = response.content_length(),
                        "Response ready"
                    );

                    let chunk_size = self.dispatcher.config().chunk_size;
                    let writer = ResponseWriter::new(response, chunk_size);
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    // A failed write abandons the connection; nothing is retried
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads until the request line is complete, the size limit is hit, the
    /// client stops sending or the read timeout expires. Whatever arrived by
    /// then is dispatched. Returns false if nothing was received.
    pub async fn read_request(&mut self) -> anyhow::Result<bool> {
        let limit = self.dispatcher.config().read_timeout;

        match tokio::time::timeout(limit, self.fill_buffer()).await {
            Ok(filled) => filled?,
            Err(_) => tracing::debug!(
                conn = self.id,
                buffered = self.buffer.len(),
                "Request line incomplete after read timeout"
            ),
        }

        Ok(!self.buffer.is_empty())
    }

    async fn fill_buffer(&mut self) -> anyhow::Result<()> {
        while !has_request_line(&self.buffer) && self.buffer.len() < MAX_REQUEST_SIZE {
            let mut temp = [0u8; 1024];
            let n = self.stream.read(&mut temp).await?;

            if n == 0 {
                break;
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }

        Ok(())
    }
}

fn first_line(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == b'\r' || b == b'\n').unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
