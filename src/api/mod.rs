pub mod attendance;
pub mod payroll;
pub mod qrcode;
pub mod report;
pub mod shift;
