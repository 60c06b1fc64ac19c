pub mod compose;
pub mod filter;
pub mod query;
pub mod service;
pub mod url;

pub use crate::domain::model::{
    CriterionNode, Filter, Operator, Record, ResponseFormat, ServiceParam, Value,
};
pub use crate::domain::ports::{BodyParser, ConfigProvider, Storage, Transport};
pub use crate::utils::error::Result;
