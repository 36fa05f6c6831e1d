use wayfinder_shared::colors::parse_hex;

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Hex color with an alpha channel applied. Unparseable input passes through.
pub fn hex_alpha_css(hex: &str, alpha: f64) -> String {
    match parse_hex(hex) {
        Some((r, g, b)) => rgba_css(r, g, b, alpha.clamp(0.0, 1.0)),
        None => hex.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_alpha_produces_rgba() {
        assert_eq!(hex_alpha_css("#3498db", 0.25), "rgba(52,152,219,0.25)");
        assert_eq!(hex_alpha_css("#fff", 2.0), "rgba(255,255,255,1)");
        assert_eq!(hex_alpha_css("red", 0.5), "red");
    }
}
