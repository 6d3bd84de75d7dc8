//! Recognition engine boundary
//!
//! The engine is a black box reached only through asynchronous commands and
//! a push-event stream. This module defines the boundary trait, the command
//! gateway, the wire protocol, and the WebSocket-backed remote engine link.
//!
//! # Module structure
//!
//! - `gateway` - the [`RecognitionEngine`] trait and [`CommandGateway`]
//! - `messages` - wire message types
//! - `remote` - WebSocket link to an out-of-process engine
//! - `error` - engine boundary errors

mod error;
mod gateway;
pub mod messages;
mod remote;

pub use error::{EngineError, EngineResult};
pub use gateway::{CommandGateway, RecognitionEngine};
pub use remote::{EngineEndpoint, RemoteEngine};
