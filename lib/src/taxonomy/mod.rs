mod row;
mod item;
mod categories;
mod catalog;

pub use row::*;
pub use item::*;
pub use categories::*;
pub use catalog::*;
