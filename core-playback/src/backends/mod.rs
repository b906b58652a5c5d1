//! Concrete backend controllers.
//!
//! Each backend wraps the shared [`StreamController`](crate::backend::StreamController)
//! state machine with its source item and the quirk policy that stream
//! protocol needs. Protocol-specific behavior lives here and nowhere else.

pub mod hls;
pub mod icecast;

pub use hls::HlsController;
pub use icecast::IcecastController;
