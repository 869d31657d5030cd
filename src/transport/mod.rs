/// HTTP transport trait and its reqwest implementation
pub mod http_client;

pub use http_client::{
    HttpTransport, ReqwestTransport, TransportError, TransportRequest, TransportResponse,
};
