mod crud;
mod helpers;
mod list;

pub use crud::{create, destroy, edit, method_spoof, show, store, update};
pub use list::index;
