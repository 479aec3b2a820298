pub mod map;
pub mod navigation;
