pub mod data_loading;
pub mod scroll;
pub mod timeline;

pub use data_loading::reduce_data_loading;
pub use scroll::{evaluate_resume, reduce_scroll};
pub use timeline::{rebuild_timeline, reduce_timeline, reveal_marker_period};
