// Placeholder avatars: a grey tile with the player's initials and team.

use image::{Rgb, RgbImage};

use crate::glyphs::{draw_text_centered, text_height, text_width};

const BACKGROUND: Rgb<u8> = Rgb([200, 200, 200]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// First letter of every capitalized name component ("LeBron James" → "LJ").
/// Falls back to the first two characters, uppercased, when no component
/// starts with a capital letter.
pub fn initials(name: &str) -> String {
    let from_words: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .filter(|c| c.is_uppercase())
        .collect();
    if !from_words.is_empty() {
        return from_words;
    }
    name.trim().chars().take(2).flat_map(char::to_uppercase).collect()
}

/// Largest scale (starting from `preferred`) at which `text` fits in `max_width`.
fn fitting_scale(text: &str, preferred: u32, max_width: u32) -> u32 {
    let mut scale = preferred.max(1);
    while scale > 1 && text_width(text, scale) > max_width {
        scale -= 1;
    }
    scale
}

/// Render a `size`×`size` placeholder for the given player.
pub fn render(name: &str, team: &str, size: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(size, size, BACKGROUND);
    let usable = size.saturating_sub(size / 10);
    let center_x = size / 2;

    let label = initials(name);
    let scale = fitting_scale(&label, (size / 25).max(1), usable);
    let top = (size / 2).saturating_sub(text_height(scale) / 2);
    draw_text_centered(&mut img, &label, center_x, top, scale, INK);

    let team = team.trim();
    if !team.is_empty() {
        let scale = fitting_scale(team, (size / 50).max(1), usable);
        let top = size.saturating_sub(text_height(scale) + size / 12);
        draw_text_centered(&mut img, team, center_x, top, scale, INK);
    }

    img
}
