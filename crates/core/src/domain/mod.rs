pub mod email;
pub mod intent;
pub mod lead;
pub mod session;
