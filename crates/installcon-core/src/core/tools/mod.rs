//! Package installs, uninstalls and index listings (`installcon -p/-u/-i`).

mod describe;
mod index_store;
mod install;
mod list;
mod paths;
mod remove;
mod wrapper;

#[cfg(test)]
pub(crate) mod testing;

pub use install::{install_package, InstallRequest};
pub use list::{list_index, ListRequest};
pub use remove::{uninstall_package, UninstallRequest};
pub use wrapper::Activation;
