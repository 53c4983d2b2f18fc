mod error;
pub use error::Error;

pub mod driver;
pub use driver::{Capability, Connection, DataSource, IsolationLevel};

mod entity;
pub use entity::Entity;

mod page;
pub use page::{Direction, Order, Page, PageResult, DEFAULT_PAGE_SIZE};

mod row;
pub use row::{Row, Rows};

mod value;
pub use value::Value;

/// A Result type alias that uses Trivet's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
