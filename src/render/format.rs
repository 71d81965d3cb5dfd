//! Numeric formatting helpers and formula renderers.
//!
//! Each formula takes the decoded value and returns `None` when the value has
//! an unexpected shape or a zero denominator, letting the caller fall back to
//! the generic rendering.

use crate::format::tiff::EntryValue;

// =============================================================================
// Helpers
// =============================================================================

/// Format with a fixed number of decimals, rounding half away from zero.
pub fn fixed(value: f64, decimals: u32) -> String {
    let scale = 10f64.powi(decimals as i32);
    // Adding 0.0 turns a negative zero into a positive one
    let rounded = (value * scale).round() / scale + 0.0;
    format!("{:.*}", decimals as usize, rounded)
}

/// Single-precision quotient in shortest round-trip form ("2.8", "72").
pub fn float_ratio(numerator: i64, denominator: i64) -> Option<String> {
    if denominator == 0 {
        return None;
    }
    Some((numerator as f32 / denominator as f32).to_string())
}

/// Single-precision quotient widened for fixed formatting.
fn ratio(numerator: i64, denominator: i64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(f64::from(numerator as f32 / denominator as f32))
}

/// Left-pad with zeros to two characters.
pub fn pad2(text: &str) -> String {
    format!("{:0>2}", text)
}

fn first_rational(value: &EntryValue) -> Option<(i64, i64)> {
    value.rationals()?.first().copied()
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>, separator: &str) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

// =============================================================================
// APEX
// =============================================================================

/// Exposure time from an APEX shutter-speed value `2^-(n/d)`.
pub fn apex_shutter(numerator: i64, denominator: i64) -> Option<String> {
    if denominator == 0 {
        return None;
    }
    let exponent = numerator as f64 / denominator as f64;
    let speed = 2f64.powf(exponent);

    if numerator < 0 || denominator < 0 {
        return Some(fixed(1.0 / speed, 0));
    }
    let rounded = speed.round();
    if rounded <= 1.0 {
        Some("1".to_string())
    } else {
        Some(format!("1/{}", rounded as u64))
    }
}

/// F-number from an APEX aperture value `sqrt(2)^(n/d)`.
///
/// One decimal, with a trailing ".0" dropped.
pub fn apex_aperture(numerator: i64, denominator: i64) -> Option<String> {
    if denominator == 0 {
        return None;
    }
    let f_number = 2f64.sqrt().powf(numerator as f64 / denominator as f64);
    let text = fixed(f_number, 1);
    Some(match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    })
}

// =============================================================================
// TIFF formulas
// =============================================================================

pub fn bits_per_sample(value: &EntryValue) -> Option<String> {
    let values = value.integers()?;
    (!values.is_empty()).then(|| join(values, ", "))
}

pub fn resolution(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    n.checked_div(d).map(|q| q.to_string())
}

pub fn ycbcr_subsampling(value: &EntryValue) -> Option<String> {
    let values = value.integers()?;
    let label = match (values.first()?, values.get(1)?) {
        (1, 1) => "YCbCr4:4:4",
        (1, 2) => "YCbCr4:4:0",
        (1, 4) => "YCbCr4:4:1",
        (2, 1) => "YCbCr4:2:2",
        (2, 2) => "YCbCr4:2:0",
        (2, 4) => "YCbCr4:2:1",
        (4, 1) => "YCbCr4:1:1",
        (4, 2) => "YCbCr4:1:0",
        _ => "Unknown",
    };
    Some(label.to_string())
}

pub fn reference_black_white(value: &EntryValue) -> Option<String> {
    let pairs = value.rationals()?;
    (!pairs.is_empty()).then(|| join(pairs.iter().flat_map(|&(n, d)| [n, d]), ", "))
}

/// Photographer and editor copyright, separated by a NUL.
///
/// A leading space means only the editor part is present.
pub fn copyright(value: &EntryValue) -> Option<String> {
    let text = value.text()?;
    if text.starts_with(' ') {
        return Some(text.replace(" \0", ""));
    }
    let mut parts = text.split('\0');
    let photographer = parts.next().unwrap_or_default();
    Some(match parts.next() {
        Some(editor) => format!("{}\n{}", photographer, editor),
        None => photographer.to_string(),
    })
}

// =============================================================================
// Exif formulas
// =============================================================================

pub fn exposure_time(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    let seconds = n.checked_div(d)?;
    if seconds > 1 {
        Some(seconds.to_string())
    } else {
        Some(format!("{}/{}", n, d))
    }
}

pub fn one_decimal(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    Some(fixed(ratio(n, d)?, 1))
}

pub fn quotient(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    float_ratio(n, d)
}

pub fn components_configuration(value: &EntryValue) -> Option<String> {
    let bytes = value.bytes()?;
    let labels = bytes.iter().map(|b| match b {
        0 => " ",
        1 => "Y",
        2 => "Cb",
        3 => "Cr",
        4 => "R",
        5 => "G",
        6 => "B",
        _ => "Unknown",
    });
    (!bytes.is_empty()).then(|| join(labels, ", "))
}

pub fn shutter_speed(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    apex_shutter(n, d)
}

pub fn aperture(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    apex_aperture(n, d)
}

/// Signed EV values (brightness, exposure bias).
pub fn exposure_value(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    let ev = ratio(n, d)?;
    if ev == 0.0 {
        Some("0".to_string())
    } else {
        Some(fixed(ev, 1))
    }
}

pub fn subject_distance(value: &EntryValue) -> Option<String> {
    match first_rational(value)? {
        (0xFFFF, 0xFFFF) => Some("Infinity".to_string()),
        (0, 0) => Some("Unknown".to_string()),
        (n, d) => Some(format!("{} m", fixed(ratio(n, d)?, 2))),
    }
}

pub fn focal_length(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    Some(format!("{} mm", fixed(ratio(n, d)?, 1)))
}

/// Lens focal range and maximum apertures, e.g. "24-70mm, f:2.8 - 2.8".
pub fn lens_info(value: &EntryValue) -> Option<String> {
    let values = value.rationals()?;
    if values.len() < 4 {
        return None;
    }
    let short = values[0].0.checked_div(values[0].1)?;
    let long = values[1].0.checked_div(values[1].1)?;
    let aperture_at = |i: usize| {
        let (n, d) = values[i];
        (n != 0 && d != 0).then(|| fixed(f64::from(n as f32 / d as f32), 1))
    };

    let mut out = if short == long {
        let mut out = format!("{}mm, f:", short);
        match aperture_at(2) {
            Some(f) => out.push_str(&format!("{}, ", f)),
            None => out.push_str("?, "),
        }
        out
    } else {
        let mut out = format!("{}-{}mm, f:", short, long);
        if let Some(f) = aperture_at(2) {
            out.push_str(&format!("{} - ", f));
        }
        match aperture_at(3) {
            Some(f) => out.push_str(&format!("{}, ", f)),
            None => out.push_str("?, "),
        }
        out
    };
    out.truncate(out.len() - 2);
    Some(out)
}

// =============================================================================
// GPS formulas
// =============================================================================

/// "DD:MM" when the seconds numerator is zero, else "DD:MM:SS".
pub fn gps_coordinate(value: &EntryValue) -> Option<String> {
    let values = value.rationals()?;
    if values.len() < 3 {
        return None;
    }
    let degrees = values[0].0.checked_div(values[0].1)?;
    if values[2].0 == 0 {
        let minutes = float_ratio(values[1].0, values[1].1)?;
        Some(format!("{}:{}", pad2(&degrees.to_string()), pad2(&minutes)))
    } else {
        let minutes = values[1].0.checked_div(values[1].1)?;
        let seconds = float_ratio(values[2].0, values[2].1)?;
        Some(format!(
            "{}:{}:{}",
            pad2(&degrees.to_string()),
            pad2(&minutes.to_string()),
            pad2(&seconds)
        ))
    }
}

pub fn gps_altitude(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    let meters = if n == 0 {
        "0".to_string()
    } else {
        fixed(n.checked_div(d)? as f64, 2)
    };
    Some(format!("{} m", meters))
}

pub fn gps_timestamp(value: &EntryValue) -> Option<String> {
    let values = value.rationals()?;
    if values.len() < 3 {
        return None;
    }
    let parts = values[..3]
        .iter()
        .map(|&(n, d)| n.checked_div(d).map(|q| pad2(&q.to_string())))
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join(":"))
}

/// Bearings (track, image direction, destination) in degrees.
pub fn gps_bearing(value: &EntryValue) -> Option<String> {
    let (n, d) = first_rational(value)?;
    Some(fixed(n.checked_div(d)? as f64, 2))
}

// =============================================================================
// Tests
// =============================================================================
