//! HTTP implementations of the backend client traits.

pub mod audit;
pub mod learning;
pub mod onramp;
pub mod transport;
pub mod wallet;

pub use audit::HttpAuditClient;
pub use learning::HttpLearningClient;
pub use onramp::HttpOnRampClient;
pub use transport::{HttpTransport, REQUEST_ID_HEADER};
pub use wallet::HttpWalletClient;
