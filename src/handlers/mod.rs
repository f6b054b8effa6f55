pub mod permission_handlers;
