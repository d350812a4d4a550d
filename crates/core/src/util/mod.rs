//! Display and file name helpers shared by the library and front ends.

mod file_name;
mod icon;
mod size;

pub use file_name::{
    compress_file_name, file_extension, remove_file_extension, InvalidFileName,
    MAX_DISPLAY_NAME_LEN,
};
pub use icon::FileIcon;
pub use size::{bytes_to_size, bytes_to_size_with, InvalidSize};
