pub mod decode;
pub mod endpoints;
pub mod error;
pub mod multipart;
pub mod request;
pub mod transport;

pub use decode::{BodyKind, DecodedBody, classify_content_type};
pub use error::ApiError;
pub use multipart::{FormData, FormPart};
pub use request::{Method, RequestBody};
pub use transport::{HEALTH_TIMEOUT, Transport};
