//! ASCII banner with gradient (LUNCHVOTE).
//! Uses the figlet standard font; falls back to plain text if it fails.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Tomato red (#ff6347).
const TOMATO: (u8, u8, u8) = (0xff, 0x63, 0x47);
/// Basil green (#2e8b57).
const BASIL: (u8, u8, u8) = (0x2e, 0x8b, 0x57);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints the welcome banner: "LUNCHVOTE" in figlet ASCII with a gradient
/// from tomato to basil, then the version line.
pub fn print_welcome() {
    let mut out = stdout();
    let art = match FIGfont::standard() {
        Ok(font) => font
            .convert("LUNCHVOTE")
            .map(|figure| figure.to_string())
            .unwrap_or_else(|| "LUNCHVOTE\n".to_string()),
        Err(_) => "LUNCHVOTE\n".to_string(),
    };
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(TOMATO, BASIL, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: BASIL.0,
        g: BASIL.1,
        b: BASIL.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("Vote early, eat well\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
