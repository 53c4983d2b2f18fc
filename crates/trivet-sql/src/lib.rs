pub mod condition;
pub use condition::{Condition, LikeType, Op};

pub mod dialect;
pub use dialect::{Dialect, Params, Placeholder};

pub mod query;
pub use query::Query;
