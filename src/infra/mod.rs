pub mod delay;
pub mod explorer_view;
pub mod fs_host;
pub mod logger;
pub mod output;
pub mod progress;
pub mod settings;
