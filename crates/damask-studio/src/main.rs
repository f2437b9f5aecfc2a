//! Headless walkthrough of the widget core.
//!
//! Builds a small window, feeds it a scripted stream of input events and
//! repaints after each one, logging which rectangles were redrawn. A second
//! thread renders its own copy of the window through a clone of the `Ui`
//! handle. Pass a path to also write the final frame as a binary PPM.
//!
//! ```text
//! RUST_LOG=debug cargo run -p damask-studio -- frame.ppm
//! ```

mod widgets;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use anyhow::{Context, Result, anyhow};

use damask_engine::logging::{LoggingConfig, init_logging};
use damask_ui::prelude::*;

use widgets::{Button, Panel, Swatch, TextField};

const WIDTH: i32 = 320;
const HEIGHT: i32 = 200;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    let output = std::env::args_os().nth(1).map(PathBuf::from);

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║            DAMASK STUDIO v0.1          ║");
    println!("  ║   retained widgets  ·  damage redraw   ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let clicks = Arc::new(AtomicUsize::new(0));
    let ui = Ui::new(UiConfig::default(), WIDTH, HEIGHT);
    let ids = build(&ui, clicks.clone())?;

    let mut frame = PixelBuffer::new(WIDTH, HEIGHT);
    present(&ui, &mut frame, "initial");

    for (label, event) in script() {
        if let Event::Resize { width, height } = event {
            frame.resize(width, height);
        }
        ui.dispatch(&event);
        present(&ui, &mut frame, label);
    }

    // Structural edits outside of any event.
    ui.set_visible(ids.swatch, false).context("hiding swatch")?;
    present(&ui, &mut frame, "swatch hidden");
    ui.destroy(ids.ok).context("destroying OK button")?;
    present(&ui, &mut frame, "OK destroyed");

    let thumbnail = {
        let ui = ui.clone();
        thread::spawn(move || {
            let mut buf = PixelBuffer::new(WIDTH / 2, HEIGHT / 2);
            let mut canvas = ui.canvas(&mut buf);
            let rects = ui.redraw_all(&mut canvas);
            log::info!("render thread repainted {rects:?}");
            buf
        })
    };
    let thumbnail = thumbnail.join().map_err(|_| anyhow!("render thread panicked"))?;
    let painted = thumbnail.pixels().iter().filter(|c| c.a != 0).count();
    log::info!("thumbnail: {painted} painted pixel(s)");

    println!("  clicks: {}", clicks.load(Ordering::Relaxed));
    println!("  widgets alive: {}", ui.widget_count());

    if let Some(path) = output {
        write_ppm(&frame, &path).with_context(|| format!("writing {}", path.display()))?;
        println!("  frame written to {}", path.display());
    }
    println!();
    Ok(())
}

struct Ids {
    swatch: WidgetId,
    ok: WidgetId,
}

/// Window background with a toolbar holding two buttons, a text field and a swatch.
fn build(ui: &Ui, clicks: Arc<AtomicUsize>) -> Result<Ids> {
    let background = ui.create(
        Panel { fill: Color::rgb(30, 32, 40), border: Color::rgb(70, 74, 90) },
        Rect::with_size(0, 0, WIDTH, HEIGHT),
    )?;
    ui.add_root(background)?;

    let toolbar = ui.create(
        Panel { fill: Color::rgb(44, 48, 60), border: Color::rgb(90, 94, 110) },
        Rect::with_size(10, 10, WIDTH - 20, 40),
    )?;
    ui.add_child(background, toolbar)?;

    let ok = {
        let clicks = clicks.clone();
        ui.create(
            Button::new("OK", move || {
                clicks.fetch_add(1, Ordering::Relaxed);
            }),
            Rect::with_size(10, 8, 60, 24),
        )?
    };
    ui.add_child(toolbar, ok)?;

    let cancel = ui.create(
        Button::new("Cancel", || println!("  [cancel] nothing to cancel")),
        Rect::with_size(80, 8, 60, 24),
    )?;
    ui.add_child(toolbar, cancel)?;

    let field = ui.create(TextField::default(), Rect::with_size(10, 70, 200, 20))?;
    ui.add_child(background, field)?;

    let swatch = ui.create(
        Swatch::gradient(32, Color::rgb(200, 60, 60), Color::rgb(60, 60, 200)),
        Rect::with_size(WIDTH - 50, 70, 32, 32),
    )?;
    ui.add_child(background, swatch)?;

    log::info!("built {} widgets", ui.widget_count());
    Ok(Ids { swatch, ok })
}

fn script() -> Vec<(&'static str, Event)> {
    let none = Modifiers::default();
    let at = |x, y| Point::new(x, y);
    vec![
        ("hover OK", Event::MouseMove { pos: at(40, 30), modifiers: none }),
        ("press OK", Event::MousePress { pos: at(40, 30), button: MouseButton::Left, modifiers: none }),
        ("release OK", Event::MouseRelease { pos: at(40, 30), button: MouseButton::Left, modifiers: none }),
        ("key Enter", Event::KeyPress { key: Key::Enter, code: 28, modifiers: none, repeat: false }),
        ("hover Cancel", Event::MouseMove { pos: at(110, 30), modifiers: none }),
        ("hover field", Event::MouseMove { pos: at(50, 80), modifiers: none }),
        ("click field", Event::MousePress { pos: at(50, 80), button: MouseButton::Left, modifiers: none }),
        ("type", Event::Char { text: "damask".into() }),
        ("backspace", Event::KeyPress { key: Key::Backspace, code: 14, modifiers: none, repeat: false }),
        ("leave", Event::MouseMove { pos: at(300, 190), modifiers: none }),
        ("expose", Event::Expose { rect: Some(Rect::with_size(0, 0, 40, 40)) }),
        ("resize", Event::Resize { width: WIDTH + 40, height: HEIGHT }),
    ]
}

fn present(ui: &Ui, frame: &mut PixelBuffer, label: &str) {
    let mut canvas = ui.canvas(frame);
    let rects = ui.redraw(&mut canvas);
    if rects.is_empty() {
        log::info!("{label:>14}: nothing to repaint");
    } else {
        log::info!("{label:>14}: repainted {rects:?}");
    }
}

/// Writes `frame` as binary PPM (alpha dropped).
fn write_ppm(frame: &PixelBuffer, path: &Path) -> Result<()> {
    let Rect { right, bottom, .. } = frame.bounds();
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "P6\n{} {}\n255\n", right + 1, bottom + 1)?;
    for px in frame.as_bytes().chunks_exact(4) {
        out.write_all(&px[..3])?;
    }
    out.flush()?;
    Ok(())
}
