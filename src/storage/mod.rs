//! Storage abstractions for page persistence.
//!
//! ## Directory Layout
//!
//! ```text
//! {root}/
//! ├── urls.txt         # Discovered URL list, one per line
//! ├── index.json       # PageRecord entries for every saved page
//! ├── stats.json       # Crawl run summary
//! ├── {name}.html      # Raw markup per page
//! └── {name}.txt       # Extracted text per page
//! ```

pub mod local;

pub use local::LocalStorage;
