/// Palette for rooms authored without an explicit color.
pub const ROOM_PALETTE: [&str; 8] = [
    "#3498db", "#2ecc71", "#e74c3c", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22", "#34495e",
];

/// Deterministic room color via CRC32 hash of the room name.
pub fn room_color(name: &str) -> &'static str {
    let hash = crc32fast::hash(name.as_bytes());
    ROOM_PALETTE[hash as usize % ROOM_PALETTE.len()]
}

/// Parse `#rrggbb` or `#rgb`. The leading `#` is optional.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
            let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
            let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let mut channels = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((channels.next()??, channels.next()??, channels.next()??))
        }
        _ => None,
    }
}

pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Lower HSL lightness by `amount` (0..1). Unparseable input is returned unchanged.
pub fn darken(hex: &str, amount: f64) -> String {
    let Some((r, g, b)) = parse_hex(hex) else {
        return hex.to_string();
    };
    let (h, s, l) = rgb_to_hsl(r, g, b);
    let (r, g, b) = hsl_to_rgb(h, s, (l - amount).clamp(0.0, 1.0));
    to_hex(r, g, b)
}

/// Convert RGB to HSL. Returns (h: 0..360, s: 0..1, l: 0..1).
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        let mut h = (g - b) / d;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s, l)
}

/// Convert HSL to RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::{darken, hsl_to_rgb, parse_hex, rgb_to_hsl, room_color, to_hex, ROOM_PALETTE};

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-9,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    #[test]
    fn roundtrip_rgb_through_hsl_is_identity() {
        let samples = [
            (0, 0, 0),
            (255, 255, 255),
            (52, 152, 219),
            (231, 76, 60),
            (46, 204, 113),
        ];

        for (r, g, b) in samples {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            assert_eq!(hsl_to_rgb(h, s, l), (r, g, b));
        }
    }

    #[test]
    fn rgb_to_hsl_gray_has_zero_saturation() {
        let (h, s, l) = rgb_to_hsl(128, 128, 128);
        assert_close(h, 0.0);
        assert_close(s, 0.0);
        assert_close(l, 128.0 / 255.0);
    }

    #[test]
    fn parse_hex_accepts_long_and_short_forms() {
        assert_eq!(parse_hex("#3498db"), Some((0x34, 0x98, 0xdb)));
        assert_eq!(parse_hex("fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(to_hex(0x34, 0x98, 0xdb), "#3498db");
    }

    #[test]
    fn darken_reduces_lightness_and_keeps_hue() {
        let darker = darken("#3498db", 0.2);
        let (r, g, b) = parse_hex(&darker).expect("darkened color parses");
        let (h0, _, l0) = rgb_to_hsl(0x34, 0x98, 0xdb);
        let (h1, _, l1) = rgb_to_hsl(r, g, b);
        assert!(l1 < l0);
        assert!((h1 - h0).abs() < 1.0);
        assert_eq!(darken("#000000", 0.3), "#000000");
        assert_eq!(darken("not-a-color", 0.3), "not-a-color");
    }

    #[test]
    fn room_color_is_deterministic_palette_entry() {
        assert_eq!(room_color("Library"), room_color("Library"));
        assert!(ROOM_PALETTE.contains(&room_color("Cafeteria")));
    }
}
