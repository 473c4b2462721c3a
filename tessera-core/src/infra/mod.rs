pub mod uploads;

pub use uploads::{DiskUploadStore, UPLOADS_PREFIX};
