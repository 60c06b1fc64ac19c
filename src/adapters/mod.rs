// Adapters layer: concrete implementations of the domain ports (http, body parsing, storage).

pub mod http;
pub mod parser;
pub mod storage;

pub use http::HttpTransport;
pub use parser::ResponseParser;
pub use storage::LocalStorage;
