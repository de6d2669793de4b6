pub mod allocator;
pub mod catalog;
pub mod generator;

pub use allocator::{duration_for_patient_type, SlotAllocator};
pub use catalog::SlotCatalog;
pub use generator::{ScheduleGenerator, ScheduleTemplate};
