//! Reference client algorithms driven through the recorder.

pub mod sort;
pub mod stack;
