pub mod auth_events;
pub mod client;
pub mod credentials;
pub mod error;
pub mod error_handler;
pub mod request;
pub mod response;
pub mod transport;

pub use auth_events::AuthEventSink;
pub use client::ApiClient;
pub use credentials::{
    BrowserCookieCredentialSource, CookieJar, CredentialSource, ExecutionContext, NoCredentials,
    RequestHeaderCredentialSource,
};
pub use error::{ApiError, ClientError};
pub use error_handler::ErrorHandler;
pub use request::{ParamValue, RequestConfig};
pub use response::ResponseBody;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
