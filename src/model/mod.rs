pub mod attendance;
pub mod payroll;
pub mod role;
pub mod shift;
