//! Small helpers shared by the library and its binaries.

pub mod ifname;
