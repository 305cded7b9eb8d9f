pub mod access;

pub use access::AccessGate;
