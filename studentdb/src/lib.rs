pub mod access;
pub mod config;
pub mod error;
pub mod model;
pub mod schema;
pub mod seed;
pub mod store;
pub mod system_db;
pub mod view;

pub use access::Records;
pub use config::Config;
pub use error::{Result, StudentDbError};
pub use model::{
    Attendance, AttendanceStatus, Mark, MarkKind, NewAttendance, NewMark, NewStudent, RecordId,
    Student,
};
pub use schema::SchemaDefinition;
pub use store::{SharedStore, Store};
pub use view::{ViewController, ViewSnapshot};
