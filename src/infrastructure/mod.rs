pub mod bridge;
pub mod logging;
pub mod sensor;
