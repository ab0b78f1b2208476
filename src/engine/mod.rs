pub mod evaluate;
pub mod progress;
pub mod scene;
