//! Accept loop
//!
//! Each accepted connection is handled by its own task. Tasks share only
//! the immutable configuration and the dispatcher built from it.

pub mod listener;
