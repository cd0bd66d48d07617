//! API handler modules.

pub mod account;
pub mod inventory;

pub use account::{
    account_management_handler, build_update_view_handler, login_handler, logout_handler,
    register_handler, update_password_handler, update_profile_handler,
};
pub use inventory::{add_vehicle_handler, inventory_management_handler};
