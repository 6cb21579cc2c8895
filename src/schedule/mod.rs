pub mod types;
pub mod ids;
pub mod input;

pub use types::{Period, ScheduleDay, ScheduleDocument, ScheduleItem, TimeType};
pub use ids::{fresh_id, ITEM_ID_PREFIX};
pub use input::{from_input, parse_input, LegacySchedule, ScheduleInput};
