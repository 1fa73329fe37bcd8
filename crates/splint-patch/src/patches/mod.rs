//! Concrete patches shipped with splint

pub mod fixed_step_start;

pub use fixed_step_start::FixedStepStart;
