pub mod bus;
pub mod collision;
pub mod device;
pub mod packet;
