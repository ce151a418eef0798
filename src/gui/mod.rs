mod app;

pub use app::ProcessNameApp;
