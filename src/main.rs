// src/main.rs

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("starting prism (native)");

    prism_engine::run_native()?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm build starts through the `wasm_bindgen(start)` entry point.
}
