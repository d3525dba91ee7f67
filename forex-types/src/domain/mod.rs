//! Domain models for the forex gateway.

pub mod options;
pub mod page;
pub mod rate;
pub mod response;

pub use options::ProviderOptions;
pub use page::{PageAdvisory, PageWindow};
pub use rate::CurrencyRate;
pub use response::ProviderResponse;
