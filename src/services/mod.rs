pub mod coupon_finder;
pub mod extractor;
pub mod openai_client;
pub mod orchestrator;
pub mod page_fetcher;
pub mod recovery;
pub mod reducer;
pub mod scorer;

#[cfg(test)]
pub mod testing;

pub use coupon_finder::*;
pub use extractor::*;
pub use openai_client::*;
pub use orchestrator::*;
pub use page_fetcher::*;
pub use recovery::*;
pub use reducer::*;
pub use scorer::*;
