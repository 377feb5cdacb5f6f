//! Runs the backdrop in a window.
//!
//! Scroll with the mouse wheel, move the pointer for parallax, press `D`
//! to toggle the debug overlay and `Escape` to quit.

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let app = backdrop::default();
    app.run();

    Ok(())
}
