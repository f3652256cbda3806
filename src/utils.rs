use anyhow::{Error, Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Redacts a device token for logging: `first10...last10`, or `***` for
/// tokens shorter than 20 characters.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();

    if chars.len() < 20 {
        return "***".to_string();
    }

    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();

    format!("{}...{}", head, tail)
}

pub fn init_tracing(log_format: &str) -> Result<(), Error> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match log_format {
        "json" => registry.with(fmt::layer().json()).try_init(),
        _ => registry.with(fmt::layer().compact()).try_init(),
    };

    result.map_err(|e| anyhow!("Failed to initialize tracing: {}", e))
}
