//! The Data Query Engine (spec §3.5/§4.6): the runtime `Row`/`Table` model,
//! the immutable `QueryBuilder`, and `DataManager`'s cached smart preload.

pub mod cache;
pub mod cancel;
pub mod http_client;
pub mod manager;
pub mod predicate;
pub mod query_builder;
pub mod row;

pub use cache::{CacheEntry, InMemoryTableCache, TableCache};
pub use cancel::CancelToken;
pub use http_client::HttpDataServiceClient;
pub use manager::{DataManager, DataServiceClient, DataServiceError, TableVersionInfo};
pub use query_builder::{QueryBuilder, SortDirection};
pub use row::{Row, Table, Value};
