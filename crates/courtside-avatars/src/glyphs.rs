// Built-in 5x7 bitmap glyphs for drawing placeholder text without a font file.

use std::borrow::Cow;

use image::{Rgb, RgbImage};

pub const GLYPH_HEIGHT: usize = 7;
const SPACE_WIDTH: u32 = 3;

#[derive(Clone, Copy)]
pub struct Glyph {
    pub width: u8,
    pub rows: [u8; GLYPH_HEIGHT],
}

const fn g5(rows: [u8; GLYPH_HEIGHT]) -> Glyph {
    Glyph { width: 5, rows }
}

const fn g3(rows: [u8; GLYPH_HEIGHT]) -> Glyph {
    Glyph { width: 3, rows }
}

/// Glyph for `ch` (case-insensitive). `None` for characters outside A-Z, 0-9
/// and a little punctuation; text is run through [`fold`] before lookup.
pub fn glyph(ch: char) -> Option<Glyph> {
    Some(match ch.to_ascii_uppercase() {
        'A' => g5([0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'B' => g5([0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
        'C' => g5([0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
        'D' => g5([0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100]),
        'E' => g5([0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
        'F' => g5([0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
        'G' => g5([0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
        'H' => g5([0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'I' => g3([0b111, 0b010, 0b010, 0b010, 0b010, 0b010, 0b111]),
        'J' => g5([0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
        'K' => g5([0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
        'L' => g5([0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
        'M' => g5([0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
        'N' => g5([0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001]),
        'O' => g5([0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'P' => g5([0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
        'Q' => g5([0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
        'R' => g5([0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
        'S' => g5([0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110]),
        'T' => g5([0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
        'U' => g5([0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'V' => g5([0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
        'W' => g5([0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010]),
        'X' => g5([0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001]),
        'Y' => g5([0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100]),
        'Z' => g5([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
        '0' => g5([0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
        '1' => g3([0b010, 0b110, 0b010, 0b010, 0b010, 0b010, 0b111]),
        '2' => g5([0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
        '3' => g5([0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
        '4' => g5([0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
        '5' => g5([0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
        '6' => g5([0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
        '7' => g5([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
        '8' => g5([0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
        '9' => g5([0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
        '-' => g3([0b000, 0b000, 0b000, 0b111, 0b000, 0b000, 0b000]),
        '.' => Glyph {
            width: 1,
            rows: [0, 0, 0, 0, 0, 0, 1],
        },
        _ => return None,
    })
}

/// ASCII transliteration, so "Şengün" draws as "Sengun". Characters with no
/// transliteration become a space.
pub fn fold(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(deunicode::deunicode_with_tofu(text, " "))
    }
}

fn advance(ch: char) -> u32 {
    match glyph(ch) {
        Some(g) => u32::from(g.width) + 1,
        None => SPACE_WIDTH,
    }
}

/// Rendered width of `text` in pixels at `scale`, without trailing spacing.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let units: u32 = fold(text).chars().map(advance).sum();
    units.saturating_sub(1) * scale
}

/// Rendered height of one line at `scale`.
pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT as u32 * scale
}

/// Draw `text` horizontally centered on `center_x` with its top edge at
/// `top`. Pixels falling outside the image are clipped.
pub fn draw_text_centered(img: &mut RgbImage, text: &str, center_x: u32, top: u32, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1);
    let text = fold(text);
    let width = text_width(&text, scale);
    let mut cursor = i64::from(center_x) - i64::from(width / 2);

    for ch in text.chars() {
        let Some(g) = glyph(ch) else {
            cursor += i64::from(SPACE_WIDTH * scale);
            continue;
        };
        for (row, pattern) in g.rows.iter().enumerate() {
            for col in 0..g.width {
                if pattern & (1 << (g.width - 1 - col)) == 0 {
                    continue;
                }
                let x0 = cursor + i64::from(col) * i64::from(scale);
                let y0 = i64::from(top) + row as i64 * i64::from(scale);
                fill_block(img, x0, y0, scale, color);
            }
        }
        cursor += i64::from((u32::from(g.width) + 1) * scale);
    }
}

fn fill_block(img: &mut RgbImage, x0: i64, y0: i64, scale: u32, color: Rgb<u8>) {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    for dy in 0..i64::from(scale) {
        for dx in 0..i64::from(scale) {
            let (x, y) = (x0 + dx, y0 + dy);
            if (0..w).contains(&x) && (0..h).contains(&y) {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
