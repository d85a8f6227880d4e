pub mod html;
pub mod layout;
