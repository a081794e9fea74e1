mod client_ip;

pub use client_ip::client_id;
