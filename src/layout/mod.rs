//! Layout engine: value resolution, dirty tracking, size/position
//! resolution, hit testing.

pub mod engine;
pub mod flags;
pub mod hit;
pub mod position;
pub mod resolve;
pub mod scheduler;
pub mod size;

pub use engine::LayoutEngine;
pub use flags::LayoutFlags;
pub use hit::{hit_test, Grip, Hit};
pub use resolve::{percent_of, Resolver};
pub use scheduler::PendingList;
pub use size::boundary_box;
