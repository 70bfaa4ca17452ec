pub mod command;
mod device_id;
mod epoch;
pub mod response;
mod value;

pub use command::{Command, CommandParams, Param, ParamValue};
pub use device_id::DeviceId;
pub use epoch::{Epoch, GATEWAY_EPOCH};
pub use response::{Fields, Record, Response, Series};
pub use value::Value;
