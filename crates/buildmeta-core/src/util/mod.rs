pub mod dates;
pub mod paths;
pub mod text;
