//! Core HTTP protocol abstractions.
//!
//! - **Requests** ([`request`]): [`RequestHeader`] as produced by the framer, and
//!   [`Request`] pairing it with its body reader
//! - **Responses** ([`response`]): [`Response`] and its [`ResponseHead`]
//! - **Header lines** ([`header`]): [`HeaderLines`], verbatim and ordered
//! - **Bodies** ([`body`]): the pull-based [`body::Body`] reader
//! - **Messages** ([`message`]): [`Message`], [`PayloadItem`] and [`PayloadSize`]
//!   fed to the response encoder
//! - **Errors** ([`error`]): [`HttpError`] answers the peer, [`StreamError`] and
//!   [`SendError`] close the connection, [`ConnectionError`] wraps them all

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod header;
pub use header::HeaderLines;

mod request;
pub use request::Request;
pub use request::RequestHeader;

mod response;
pub use response::Response;
pub use response::ResponseHead;

mod error;
pub use error::ConnectionError;
pub use error::HttpError;
pub use error::SendError;
pub use error::StreamError;

pub mod body;
