pub mod converter;
pub mod models;
pub mod provider;

pub mod mock;

pub use mock::{MockGenerator, MockResponse};
pub use provider::{ChatCompletionsProvider, ProviderConfig};
