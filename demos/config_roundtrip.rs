//! Typed configuration read from XDL and written back as XDL and JSON.
//!
//! Run with: cargo run --example config_roundtrip

use serde::{Deserialize, Serialize};
use serde_xdl::{codec, from_str, to_json_string, to_string, to_string_pretty, to_value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Server {
    host: String,
    port: u16,
    tls: bool,
    workers: Option<u32>,
    routes: Vec<Route>,
    mode: Mode,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Route {
    path: String,
    upstream: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
enum Mode {
    Development,
    Production { replicas: u32 },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let text = r#"
        Server{
            host = "0.0.0.0",
            port = 8443,
            tls = Y,
            workers = NUL,
            routes = [
                Route{path = "/api", upstream = "http://10.0.0.2:9000"},
                Route{path = "/static", upstream = "http://10.0.0.3:9000"}
            ],
            mode = {Production = {replicas = 3}}
        }
    "#;

    let server: Server = from_str(text)?;
    println!("Parsed: {:#?}\n", server);

    let compact = to_string(&server)?;
    println!("Compact XDL:\n{}\n", compact);
    println!("Pretty XDL:\n{}\n", to_string_pretty(&server)?);
    println!("JSON:\n{}\n", to_json_string(&server)?);

    let back: Server = from_str(&compact)?;
    assert_eq!(server, back);
    println!("Round trip preserved the configuration");

    // Binary secrets travel as Base64 strings inside the document
    let mut doc = to_value(&server)?;
    doc.set("cert_fingerprint", codec::encode_hex(&[0xde, 0xad, 0xbe, 0xef]))?;
    doc.set("key", codec::encode_base64(b"not a real key"))?;
    println!("With secrets: {}", doc);

    Ok(())
}
