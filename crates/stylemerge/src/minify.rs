//! Production minifier backed by lightningcss

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

use stylemerge_core::MinifyError;

/// Minify a merged bundle into a single chunk.
pub fn minify_css(css: &str) -> Result<Vec<String>, MinifyError> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|err| MinifyError::new(err.to_string()))?;

    sheet
        .minify(MinifyOptions::default())
        .map_err(|err| MinifyError::new(err.to_string()))?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|err| MinifyError::new(err.to_string()))?;

    Ok(vec![printed.code])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minifies_to_one_chunk() {
        let chunks = minify_css("@import 'x.css';\n\n.a {\n  color: red;\n}").unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("@import"));
        assert!(chunks[0].contains(".a{color:red}"));
    }

    #[test]
    fn test_empty_bundle() {
        assert_eq!(minify_css("").unwrap(), vec![String::new()]);
    }
}
