pub mod console;
pub mod table;

pub use table::ResponseTable;
