pub mod input;
pub mod state;

pub use cube_report_core::Focus;
pub use input::handle_input;
pub use state::App;
