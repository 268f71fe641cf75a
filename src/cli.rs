// cli.rs - Command-line interface configuration
use clap::Parser;

use crate::core::frame_driver::Trigger;

#[derive(Parser, Debug, Clone)]
#[command(name = "sphere-tracer")]
#[command(about = "WebGPU sphere ray tracer", long_about = None)]
pub struct Cli {
    /// Hide the sphere control panel
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Render continuously with animated time instead of on each change
    #[arg(long)]
    pub animate: bool,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Log filter in env_logger syntax; overrides RUST_LOG
    #[arg(long = "log")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn trigger(&self) -> Trigger {
        if self.animate {
            Trigger::OnTick
        } else {
            Trigger::OnChange
        }
    }
}
