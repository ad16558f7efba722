//! Sample-config command implementation

use hookgate_config::SAMPLE_CONFIG;
use std::io::{self, Write};

/// Write the starter configuration
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_sample<W: Write>(writer: &mut W) -> io::Result<()> {
    writer.write_all(SAMPLE_CONFIG.as_bytes())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use hookgate_config::PipelineConfig;

    #[test]
    fn test_sample_is_valid_configuration() {
        let mut out = Vec::new();
        write_sample(&mut out).unwrap();

        let config = PipelineConfig::from_yaml_str(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(config.language_version("python"), Some("python3.8"));
        assert!(config.declarations().any(|(_, hook)| hook.id == "check-merge-conflict"));
    }
}
