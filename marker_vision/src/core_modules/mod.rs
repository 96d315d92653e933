pub mod candidate;
pub mod contour;
pub mod frame;
pub mod frame_analyzer;
pub mod mask;
pub mod moments;
pub mod observer;
pub mod pixel;
pub mod target_resolver;
