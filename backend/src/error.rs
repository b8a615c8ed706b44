use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to the routing service failed: {0}")]
    Http(#[from] reqwest::Error),
}
