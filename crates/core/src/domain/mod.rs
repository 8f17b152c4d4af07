pub mod bar;
pub mod record;
