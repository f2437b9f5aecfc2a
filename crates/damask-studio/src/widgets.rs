//! Small widgets used by the walkthrough.

use damask_ui::prelude::*;

// ── Panel ─────────────────────────────────────────────────────────────────

/// Flat background with a one-pixel border.
pub struct Panel {
    pub fill: Color,
    pub border: Color,
}

impl Widget for Panel {
    fn draw(&mut self, canvas: &mut Canvas<'_>, area: Rect) {
        canvas.draw_box(area, self.fill, BlendMode::Replace);
        outline(canvas, area, self.border);
    }

    fn on_state_change(&mut self, cx: &mut EventCx<'_>, change: StateChange) {
        if let StateChange::ChildAdded(child) = change {
            log::debug!("panel {} adopted {child}", cx.id());
        }
    }
}

fn outline(canvas: &mut Canvas<'_>, area: Rect, color: Color) {
    let (w, h) = (area.width(), area.height());
    canvas.draw_line(area.left, area.top, w, Orientation::Horizontal, color);
    canvas.draw_line(area.left, area.bottom, w, Orientation::Horizontal, color);
    canvas.draw_line(area.left, area.top, h, Orientation::Vertical, color);
    canvas.draw_line(area.right, area.top, h, Orientation::Vertical, color);
}

// ── Button ────────────────────────────────────────────────────────────────

/// Clickable box: highlights on hover, darkens while pressed, fires on release.
///
/// Enter or Space also fire it while it has keyboard focus.
pub struct Button {
    label: &'static str,
    hot: bool,
    pressed: bool,
    focused: bool,
    on_click: Box<dyn FnMut() + Send>,
}

impl Button {
    const IDLE: Color = Color::rgb(58, 64, 82);
    const HOT: Color = Color::rgb(84, 96, 128);
    const DOWN: Color = Color::rgb(36, 40, 52);
    const RING: Color = Color::rgb(240, 190, 60);

    pub fn new(label: &'static str, on_click: impl FnMut() + Send + 'static) -> Self {
        Self { label, hot: false, pressed: false, focused: false, on_click: Box::new(on_click) }
    }

    fn click(&mut self) {
        log::info!("button '{}' clicked", self.label);
        (self.on_click)();
    }
}

impl Widget for Button {
    fn draw(&mut self, canvas: &mut Canvas<'_>, area: Rect) {
        let fill = match (self.pressed, self.hot) {
            (true, _) => Self::DOWN,
            (false, true) => Self::HOT,
            (false, false) => Self::IDLE,
        };
        canvas.draw_box(area, fill, BlendMode::Replace);

        let coverage = diamond();
        if let Some(mask) = Mask::new(GLYPH, GLYPH, &coverage) {
            let y = (area.height() - GLYPH) / 2;
            canvas.blend_glyph(6, y, &mask, Color::WHITE);
        }

        if self.focused {
            outline(canvas, area, Self::RING);
        }
    }

    fn on_event(&mut self, cx: &mut EventCx<'_>, event: &Event) {
        let before = (self.hot, self.pressed, self.focused);
        match event {
            Event::MouseEnter => self.hot = true,
            Event::MouseLeave => {
                self.hot = false;
                self.pressed = false;
            }
            Event::MousePress { button: MouseButton::Left, .. } => self.pressed = true,
            Event::MouseRelease { button: MouseButton::Left, .. } => {
                if std::mem::take(&mut self.pressed) {
                    self.click();
                }
            }
            Event::KeyPress { key: Key::Enter | Key::Space, repeat: false, .. } => self.click(),
            Event::FocusGained => self.focused = true,
            Event::FocusLost => self.focused = false,
            _ => {}
        }
        if before != (self.hot, self.pressed, self.focused) {
            cx.request_redraw();
        }
    }
}

const GLYPH: i32 = 9;

/// Coverage mask of a filled diamond, GLYPH × GLYPH.
fn diamond() -> Vec<u8> {
    let c = GLYPH / 2;
    (0..GLYPH * GLYPH)
        .map(|i| {
            let (x, y) = (i % GLYPH, i / GLYPH);
            let d = (x - c).abs() + (y - c).abs();
            match d {
                d if d < c => 255,
                d if d == c => 128,
                _ => 0,
            }
        })
        .collect()
}

// ── TextField ─────────────────────────────────────────────────────────────

/// Single-line input; each character is drawn as a block cell.
#[derive(Default)]
pub struct TextField {
    text: String,
    focused: bool,
}

impl TextField {
    const CELL: i32 = 6;
}

impl Widget for TextField {
    fn draw(&mut self, canvas: &mut Canvas<'_>, area: Rect) {
        canvas.draw_box(area, Color::rgb(20, 22, 28), BlendMode::Replace);
        let y = (area.height() - Self::CELL) / 2;
        let mut x = 4;
        for _ in self.text.chars() {
            canvas.draw_box(Rect::with_size(x, y, Self::CELL - 1, Self::CELL), Color::rgb(200, 200, 210), BlendMode::Over);
            x += Self::CELL;
        }
        if self.focused {
            canvas.draw_line(x, y - 1, Self::CELL + 2, Orientation::Vertical, Color::WHITE);
        }
    }

    fn on_event(&mut self, cx: &mut EventCx<'_>, event: &Event) {
        match event {
            Event::Char { text } => self.text.push_str(text),
            Event::KeyPress { key: Key::Backspace, .. } => {
                self.text.pop();
            }
            Event::MousePress { .. } => cx.request_focus(),
            Event::FocusGained => self.focused = true,
            Event::FocusLost => self.focused = false,
            _ => return,
        }
        log::debug!("text field: {:?}", self.text);
        cx.request_redraw();
    }
}

// ── Swatch ────────────────────────────────────────────────────────────────

/// Blits a generated gradient image.
pub struct Swatch {
    size: i32,
    pixels: Vec<Color>,
}

impl Swatch {
    pub fn gradient(size: i32, from: Color, to: Color) -> Self {
        let size = size.max(1);
        let lerp = |a: u8, b: u8, t: i32| (a as i32 + (b as i32 - a as i32) * t / (size - 1).max(1)) as u8;
        let pixels = (0..size * size)
            .map(|i| {
                let t = i % size;
                Color::rgb(lerp(from.r, to.r, t), lerp(from.g, to.g, t), lerp(from.b, to.b, t))
            })
            .collect();
        Self { size, pixels }
    }
}

impl Widget for Swatch {
    fn draw(&mut self, canvas: &mut Canvas<'_>, _area: Rect) {
        if let Some(image) = Image::new(self.size, self.size, &self.pixels) {
            canvas.blit(0, 0, &image, BlendMode::Replace);
        }
    }
}
