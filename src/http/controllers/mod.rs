pub mod auth_controller;
pub mod datasets_controller;
pub mod health_controller;

pub use auth_controller::{
    change_password_handler, list_users_handler, login_handler, logout_handler, me_handler,
    register_handler, update_me_handler,
};
pub use datasets_controller::{
    dataset_charts_handler, dataset_view_handler, list_datasets_handler, upload_dataset_handler,
};
pub use health_controller::{health_handler, root_handler};
