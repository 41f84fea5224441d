mod result;

pub use result::{is_basic_default_value, LvaReturn};
