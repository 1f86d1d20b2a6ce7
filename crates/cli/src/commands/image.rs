//! Image resolution commands.
//!
//! # Environment Variables
//!
//! - `VETMART_API_BASE_URL` - Used when `--base-url` is not given
//! - `VETMART_IMAGE_TYPO_FILE` - Optional typo table override

use tracing::info;
use vetmart_checkout::{CheckoutConfig, ResolvedImage};

/// Resolve one raw reference and print the result.
///
/// Prints the URL (or inline payload) when the reference resolves and
/// `unresolved` otherwise.
///
/// # Errors
///
/// Returns an error if no base URL is given and the environment
/// configuration cannot be loaded.
#[allow(clippy::print_stdout)]
pub fn resolve(input: &str, base_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match base_url {
        Some(base_url) => CheckoutConfig::new(base_url)?,
        None => CheckoutConfig::from_env()?,
    };
    let resolver = config.image_resolver();

    let resolved = resolver.resolve(Some(input));
    info!(
        base_url = resolver.base_url(),
        resolved = resolved.is_resolved(),
        "Resolved image reference"
    );

    match resolved {
        ResolvedImage::Absolute(url) | ResolvedImage::Inline(url) => println!("{url}"),
        ResolvedImage::Unresolved => println!("unresolved"),
    }
    Ok(())
}
