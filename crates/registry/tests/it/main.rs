mod client;
mod roles;
