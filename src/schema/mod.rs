/// Data types shared by every pipeline stage.
pub mod diagnostic;
pub mod event;
pub mod scene;
pub mod token;
pub mod value;
