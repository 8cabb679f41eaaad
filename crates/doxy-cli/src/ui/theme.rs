//! Glyphs and number formatting shared by the console output.

/// Status glyphs.
#[derive(Debug, Clone, Copy)]
pub struct Icons {
    pub section: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            section: "==>",
            success: "✓",
            warning: "!",
            error: "✗",
        }
    }
}

/// Human-readable byte count (`1.5 MB`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// `12.0 MB / 48.3 MB (24%)`, or just the byte count when the total is unknown.
pub fn format_progress(current: u64, total: Option<u64>) -> String {
    match total.filter(|&t| t > 0) {
        Some(t) => {
            let percent = current.saturating_mul(100) / t;
            format!("{} / {} ({percent}%)", format_size(current), format_size(t))
        }
        None => format_size(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(format_progress(512, Some(1024)), "512 B / 1.0 KB (50%)");
        assert_eq!(format_progress(2048, None), "2.0 KB");
        assert_eq!(format_progress(10, Some(0)), "10 B");
    }
}
