//! Color helpers for data set palettes.

/// Normalize a palette entry to `#RRGGBB` form.
pub fn normalize_color(color: &str) -> String {
    if color.starts_with('#') {
        color.to_string()
    } else {
        format!("#{}", color)
    }
}

fn hex_to_rgb(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Produce `count` shades of `color`, from darker to lighter.
///
/// Shades are spread over -50%..50% of the distance to white. A color that
/// cannot be parsed is repeated unchanged.
pub fn get_color_variations(color: &str, count: usize) -> Vec<String> {
    let base = normalize_color(color);
    if count <= 1 {
        return vec![base];
    }

    let rgb = match hex_to_rgb(&base) {
        Some(rgb) => rgb,
        None => return vec![base; count],
    };

    let max = 50.0;
    let step = max * 2.0 / count as f64;
    let mut range: Vec<f64> = (0..)
        .map(|i| -max + i as f64 * step)
        .take_while(|v| *v <= max + 1e-9)
        .collect();

    // Drop edge values alternately until the requested count remains.
    while range.len() > count {
        if range.len() % 2 == 1 {
            range.remove(0);
        } else {
            range.pop();
        }
    }

    range
        .into_iter()
        .map(|shift| {
            let channels: Vec<String> = rgb
                .iter()
                .map(|&c| {
                    let c = c as f64;
                    let shifted = (c + (255.0 - c) * shift / 100.0).round().clamp(0.0, 255.0);
                    format!("{:02X}", shifted as u8)
                })
                .collect();
            format!("#{}", channels.concat())
        })
        .collect()
}
