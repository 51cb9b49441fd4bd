//! Request handler traits and utilities.
//!
//! A [`Handler`] receives the parsed request with its body reader and returns a
//! response. It may read the body (never past its declared length) or leave it;
//! the connection drains whatever is left before framing the next request.
//!
//! - [`make_handler`] turns an async function into a handler
//! - [`EchoHandler`] is the sample dispatch used by the bundled server

mod echo_handler;

use async_trait::async_trait;

use crate::protocol::{ConnectionError, Request, Response};

pub use echo_handler::EchoHandler;

#[async_trait]
pub trait Handler: Send + Sync {
    /// Produces the response for `req`.
    ///
    /// An [`HttpError`](crate::protocol::HttpError) (converted into
    /// [`ConnectionError`]) is answered with its status and message, then the
    /// connection is closed.
    async fn call(&self, req: Request) -> Result<Response, ConnectionError>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, ConnectionError>> + Send,
{
    async fn call(&self, req: Request) -> Result<Response, ConnectionError> {
        (self.f)(req).await
    }
}

pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut,
    Fut: Future<Output = Result<Response, ConnectionError>>,
{
    HandlerFn { f }
}
