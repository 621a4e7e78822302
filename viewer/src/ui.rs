use raylib::prelude::*;

pub const SCREEN_WIDTH: i32 = 720;
pub const SCREEN_HEIGHT: i32 = 820;

pub const FONT_SIZE: i32 = 20;
pub const TITLE_SIZE: i32 = 36;

pub const IMAGE_SIZE: f32 = 320.0;
pub const IMAGE_RECT: Rectangle = Rectangle { x: 200.0, y: 40.0, width: IMAGE_SIZE, height: IMAGE_SIZE };

pub const WALLET_BUTTON: Rectangle = Rectangle { x: 520.0, y: 760.0, width: 180.0, height: 40.0 };
pub const MINUS_BUTTON: Rectangle = Rectangle { x: 200.0, y: 560.0, width: 60.0, height: 48.0 };
pub const QUANTITY_FIELD: Rectangle = Rectangle { x: 270.0, y: 560.0, width: 180.0, height: 48.0 };
pub const PLUS_BUTTON: Rectangle = Rectangle { x: 460.0, y: 560.0, width: 60.0, height: 48.0 };
pub const CLAIM_BUTTON: Rectangle = Rectangle { x: 200.0, y: 630.0, width: 320.0, height: 56.0 };

pub const ALERT_BOX: Rectangle = Rectangle { x: 80.0, y: 300.0, width: 560.0, height: 220.0 };
pub const ALERT_OK: Rectangle = Rectangle { x: 300.0, y: 460.0, width: 120.0, height: 40.0 };

const ACCENT: Color = Color { r: 58, g: 84, b: 230, a: 255 };

pub fn clicked(rl: &RaylibHandle, rect: Rectangle) -> bool {
    rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) && rect.check_collision_point_rec(rl.get_mouse_position())
}

pub fn button(d: &mut RaylibDrawHandle, rect: Rectangle, label: &str, enabled: bool) {
    let fill = if enabled { ACCENT } else { Color::LIGHTGRAY };
    d.draw_rectangle_rec(rect, fill);
    centered_text(d, rect, label, FONT_SIZE, Color::WHITE);
}

pub fn text_field(d: &mut RaylibDrawHandle, rect: Rectangle, text: &str, focused: bool) {
    d.draw_rectangle_rec(rect, Color::WHITE);
    let border = if focused { ACCENT } else { Color::GRAY };
    d.draw_rectangle_lines_ex(rect, 2.0, border);
    let shown = if focused { format!("{text}_") } else { text.to_string() };
    centered_text(d, rect, &shown, FONT_SIZE + 4, Color::BLACK);
}

pub fn centered_text(d: &mut RaylibDrawHandle, rect: Rectangle, text: &str, size: i32, color: Color) {
    let width = text_width(text, size);
    let x = rect.x as i32 + (rect.width as i32 - width) / 2;
    let y = rect.y as i32 + (rect.height as i32 - size) / 2;
    d.draw_text(text, x, y, size, color);
}

/// Centered on the window width, cut into lines that fit `max_width`.
pub fn paragraph(d: &mut RaylibDrawHandle, text: &str, y: i32, size: i32, max_width: i32, color: Color) -> i32 {
    let mut y = y;
    for line in wrap(text, max_width / (size / 2).max(1)) {
        let width = text_width(&line, size);
        d.draw_text(&line, (SCREEN_WIDTH - width) / 2, y, size, color);
        y += size + 6;
    }
    y
}

pub fn alert(d: &mut RaylibDrawHandle, message: &str) {
    d.draw_rectangle(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT, Color::new(0, 0, 0, 128));
    d.draw_rectangle_rec(ALERT_BOX, Color::RAYWHITE);
    d.draw_rectangle_lines_ex(ALERT_BOX, 2.0, Color::MAROON);
    let mut y = ALERT_BOX.y as i32 + 20;
    for line in wrap(message, 48).into_iter().take(6) {
        d.draw_text(&line, ALERT_BOX.x as i32 + 20, y, FONT_SIZE, Color::MAROON);
        y += FONT_SIZE + 4;
    }
    button(d, ALERT_OK, "OK", true);
}

pub fn toast(d: &mut RaylibDrawHandle, message: &str) {
    let rect = Rectangle::new(40.0, 700.0, (SCREEN_WIDTH - 80) as f32, 44.0);
    d.draw_rectangle_rec(rect, Color::DARKGREEN);
    centered_text(d, rect, message, FONT_SIZE, Color::WHITE);
}

/// Width of `text` in the default font, close enough to center labels.
pub fn text_width(text: &str, size: i32) -> i32 {
    text.chars().count() as i32 * size * 3 / 5
}

/// Greedy word wrap on character count.
pub fn wrap(text: &str, max_chars: i32) -> Vec<String> {
    let max_chars = max_chars.max(1) as usize;
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0;
    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if line_chars > 0 && line_chars + 1 + word_chars > max_chars {
            lines.push(std::mem::take(&mut line));
            line_chars = 0;
        }
        if line_chars > 0 {
            line.push(' ');
            line_chars += 1;
        }
        line.push_str(word);
        line_chars += word_chars;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_width_scales_with_size() {
        assert_eq!(text_width("", 20), 0);
        assert_eq!(text_width("abcde", 20), 60);
        assert!(text_width("abc", 40) > text_width("abc", 20));
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap("one two three four", 9), vec!["one two", "three", "four"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn wrap_counts_chars_not_bytes() {
        assert_eq!(wrap("épée fûté", 9), vec!["épée fûté"]);
        assert_eq!(text_width("épée", 20), text_width("epee", 20));
    }

    #[test]
    fn long_word_gets_its_own_line() {
        assert_eq!(wrap("a supercalifragilistic b", 5), vec!["a", "supercalifragilistic", "b"]);
    }
}
