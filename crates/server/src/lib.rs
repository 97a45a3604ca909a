pub mod routes;
pub mod startup;
pub mod state;
pub mod errors;
pub mod openapi;

pub use routes::build_router;
pub use startup::run;
pub use state::AppState;
