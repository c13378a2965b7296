pub mod base_url;
pub mod current_user;
