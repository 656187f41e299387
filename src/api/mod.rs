mod rest;

pub use rest::{create_router, AppError, ApiState, SimulateRequest};
