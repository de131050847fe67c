// Build identity, baked in from Cargo.toml

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Plain-text landing line served at GET /.
pub fn banner() -> String {
    format!("{} {} - job metrics at /metrics", NAME, VERSION)
}
