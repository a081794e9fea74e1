pub mod admin;
pub mod links;
pub mod redirect;
