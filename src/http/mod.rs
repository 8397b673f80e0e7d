//! HTTP/1.0 protocol layer.
//!
//! # Architecture
//!
//! - **`connection`**: owns one accepted connection: read, dispatch, write, close
//! - **`parser`**: parses the request line out of the raw request bytes
//! - **`request`**: request line representation
//! - **`response`**: response representation and the shared head formatter
//! - **`writer`**: serializes and writes a response, streaming file bodies
//! - **`mime`**: content type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for the request line
//!        └──────┬──────┘
//!               │ Request received (or nothing: → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Dispatch to a handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send head and body
//!        └──────┬───────────┘
//!               │
//!               ▼
//!            Closed
//! ```
//!
//! There is no keep-alive: every connection carries exactly one request.

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
