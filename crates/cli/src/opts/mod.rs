mod mirror;
mod registry;

pub use mirror::MirrorOpts;
pub use registry::RegistryOpts;
