mod network;
mod session;
