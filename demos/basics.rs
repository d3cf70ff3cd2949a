//! Parsing, reading, building and encoding dynamic values.
//!
//! Run with: cargo run --example basics
//! Set RUST_LOG=serde_xdl=debug to see parse diagnostics.

use serde_xdl::{decode_xdl, encode_json, encode_xdl, parse_xdl, xdl, Kind, Var};
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let text = r#"
        // render settings
        Render{
            width = 1920, height = 1080,
            samples = 64,
            /* post effects */
            effects = [Bloom{strength = 0.4}, Vignette{radius = 1.2e0}],
            denoise = Y
        }
    "#;

    let render = decode_xdl(text);
    println!("Tagged Render: {}", render.is("Render"));
    println!("Size: {}x{}", render.get("width"), render.get("height"));
    println!("Denoise enabled: {}", render.get("denoise").is_truthy());
    println!("Gamma (default): {}", render.get_or("gamma", 2.2));

    let effects = render.get("effects");
    for i in 0..effects.len() {
        println!("Effect: {}", effects.at(i).tag().unwrap_or_default());
    }

    // Copies alias until deep_clone detaches them
    let mut alias = render.clone();
    alias.set("samples", 128)?;
    let mut detached = render.deep_clone();
    detached.set("samples", 16)?;
    println!("Samples after aliasing write: {}", render.get("samples"));
    println!("Samples in detached copy: {}\n", detached.get("samples"));

    println!("Canonical XDL:\n{}\n", encode_xdl(&render)?);
    println!("JSON:\n{}\n", encode_json(&render)?);

    // Malformed input: sentinel at the boundary, offset in the diagnostic API
    let broken = "[Y, N)";
    println!("decode_xdl({:?}) is NONE: {}", broken, decode_xdl(broken).is(Kind::None));
    if let Err(e) = parse_xdl(broken) {
        println!("parse_xdl({:?}) failed: {}\n", broken, e);
    }

    // Building values
    let mut events = Var::None;
    events.push(xdl!({ "kind": "start", "at": 0 }))?;
    events.push(Var::tagged("Stop").with("at", 12.5))?;
    println!("Events: {}", encode_xdl(&events)?);

    Ok(())
}
