mod usage;

pub use usage::{Usage, UsageFlag, UsageFlags, UsageId, UsageTable};
