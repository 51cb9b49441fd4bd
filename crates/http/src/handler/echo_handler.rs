use async_trait::async_trait;
use http::StatusCode;
use tracing::info;

use crate::handler::Handler;
use crate::protocol::{ConnectionError, Request, Response};

/// Identifies responses produced by [`EchoHandler`].
pub const SERVER_NAME: &str = "pull-http";

const DEFAULT_BODY: &str = "Hello World!\r\n";

/// Sample handler: `/echo` answers with the request body, every other path with a
/// fixed greeting.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

impl EchoHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for EchoHandler {
    async fn call(&self, req: Request) -> Result<Response, ConnectionError> {
        let (header, mut body) = req.into_parts();
        info!(method = %header.method(), target = header.target(), "receive request");

        let response = match header.path() {
            "/echo" => {
                let bytes = body.collect().await?;
                Response::new(StatusCode::OK, bytes)
            }
            _ => Response::new(StatusCode::OK, DEFAULT_BODY),
        };

        Ok(response.header("Server", SERVER_NAME))
    }
}
